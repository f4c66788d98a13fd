// relay-flow/src/pipeline/execution.rs

//! `Pipeline::run()`: executes steps in order against one shared context.

use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::core::handler::Handler;
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use tracing::{event, instrument, Instrument, Level};

/// What a phase asked the run loop to do next.
enum PhaseOutcome {
  Continue,
  Stop,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs every step in declaration order.
  ///
  /// Within a step, `before` handlers run first, then `on`, then `after`, each in
  /// registration order. A `Stop` from any handler ends the run with
  /// `PipelineResult::Stopped`; an error ends it with that error.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(pipeline = %self.name, num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();

      if !self.has_handlers(step_name) {
        if step_def.optional {
          event!(Level::DEBUG, step_name, "Optional step has no handlers, skipping.");
          continue;
        }
        event!(Level::ERROR, step_name, "Non-optional step has no handlers.");
        return Err(Err::from(FlowError::HandlerMissing {
          pipeline: self.name.clone(),
          step_name: step_def.name.clone(),
        }));
      }

      let step_span = tracing::info_span!("pipeline_step", step_name, step_index = step_idx);
      let outcome = async {
        for (phase_name, phase) in [("before", &self.before), ("on", &self.on), ("after", &self.after)] {
          if let Some(handlers) = phase.get(step_name) {
            if let PhaseOutcome::Stop = Self::run_phase(phase_name, handlers, &ctx_data).await? {
              return Ok::<_, Err>(PhaseOutcome::Stop);
            }
          }
        }
        Ok(PhaseOutcome::Continue)
      }
      .instrument(step_span)
      .await?;

      if let PhaseOutcome::Stop = outcome {
        event!(Level::INFO, step_name, "Pipeline stopped by a handler.");
        return Ok(PipelineResult::Stopped {
          at_step: step_def.name.clone(),
        });
      }
    }

    event!(Level::DEBUG, "Pipeline execution completed.");
    Ok(PipelineResult::Completed)
  }

  async fn run_phase(
    phase_name: &'static str,
    handlers: &[Handler<TData, Err>],
    ctx_data: &ContextData<TData>,
  ) -> Result<PhaseOutcome, Err> {
    for (handler_idx, handler_fn) in handlers.iter().enumerate() {
      match handler_fn(ctx_data.clone()).await {
        Ok(PipelineControl::Continue) => {}
        Ok(PipelineControl::Stop) => return Ok(PhaseOutcome::Stop),
        Err(e) => {
          event!(Level::WARN, phase = phase_name, handler_index = handler_idx, error = %e, "Handler failed.");
          return Err(e);
        }
      }
    }
    Ok(PhaseOutcome::Continue)
  }
}
