// relay-flow/src/core/control.rs

//! Signals for controlling pipeline flow and the outcome of a pipeline run.

/// Returned by a handler to continue with the next handler/step or halt the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  Continue,
  /// Halt the pipeline. No further handlers in this or later steps run.
  Stop,
}

/// Outcome of a full pipeline execution that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineResult {
  /// Every step ran to the end.
  Completed,
  /// A handler returned `PipelineControl::Stop` while running `at_step`.
  Stopped { at_step: String },
}

impl PipelineResult {
  pub fn is_completed(&self) -> bool {
    matches!(self, PipelineResult::Completed)
  }

  /// Name of the step that stopped the run, if any.
  pub fn stopped_at(&self) -> Option<&str> {
    match self {
      PipelineResult::Completed => None,
      PipelineResult::Stopped { at_step } => Some(at_step.as_str()),
    }
  }
}
