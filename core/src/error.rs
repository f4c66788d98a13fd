// relay-flow/src/error.rs
use thiserror::Error;

/// Errors raised by the engine itself rather than by user handlers.
///
/// A pipeline's own error type must be constructible from `FlowError` so that
/// engine failures surface through the same `Result` as handler failures.
#[derive(Debug, Error)]
pub enum FlowError {
  #[error("Handler missing for non-optional step '{step_name}' in pipeline '{pipeline}'")]
  HandlerMissing { pipeline: String, step_name: String },
}
