// relay-flow/src/pipeline/hooks.rs

//! Registration of `before`, `on` and `after` handlers.

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use crate::core::handler::Handler;
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use std::collections::HashMap;
use std::future::Future;
use tracing::{event, Level};

/// Boxes a user handler and converts its error into the pipeline's `Err`.
fn wrap_handler<TData, Err, F, UserErr>(
  handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
) -> Handler<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: 'static,
  F: Future<Output = Result<PipelineControl, UserErr>> + Send + 'static,
  UserErr: Into<Err> + Send + Sync + 'static,
{
  Box::new(move |ctx_data| {
    let user_fut = handler_fn(ctx_data);
    Box::pin(async move { user_fut.await.map_err(Into::into) })
  })
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn push_handler(
    phase: &mut HashMap<String, Vec<Handler<TData, Err>>>,
    step_name: &str,
    handler: Handler<TData, Err>,
  ) {
    phase.entry(step_name.to_string()).or_default().push(handler);
  }

  /// Registers a handler that runs before the step's `on` handlers.
  pub fn before_root<F, UserErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    Self::push_handler(&mut self.before, step_name, wrap_handler(handler_fn));
    event!(Level::TRACE, pipeline = %self.name, %step_name, "before handler registered.");
  }

  /// Registers the main handler(s) of a step.
  pub fn on_root<F, UserErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    Self::push_handler(&mut self.on, step_name, wrap_handler(handler_fn));
    event!(Level::TRACE, pipeline = %self.name, %step_name, "on handler registered.");
  }

  /// Registers a handler that runs after the step's `on` handlers.
  pub fn after_root<F, UserErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    Self::push_handler(&mut self.after, step_name, wrap_handler(handler_fn));
    event!(Level::TRACE, pipeline = %self.name, %step_name, "after handler registered.");
  }
}
