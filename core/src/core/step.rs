// relay-flow/src/core/step.rs

/// A named step in a pipeline.
///
/// Optional steps without any registered handler are skipped silently; a
/// non-optional step without handlers fails the run with `FlowError::HandlerMissing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDef {
  pub name: String,
  pub optional: bool,
}

impl StepDef {
  pub fn new(name: impl Into<String>, optional: bool) -> Self {
    Self {
      name: name.into(),
      optional,
    }
  }
}
