// relay-flow/src/pipeline/definition.rs

//! The `Pipeline<TData, Err>` struct and its construction.

use crate::core::handler::Handler;
use crate::core::step::StepDef;
use crate::error::FlowError;
use std::collections::HashMap;

/// An ordered set of named steps over a root context `TData`.
///
/// `Err` is the error type handlers return; it must absorb `FlowError` so that
/// engine failures (such as a missing handler) come back through the same channel.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Used in tracing spans and error messages.
  pub(crate) name: String,
  pub(crate) steps: Vec<StepDef>,

  pub(crate) before: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) on: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) after: HashMap<String, Vec<Handler<TData, Err>>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Creates a pipeline from `(step_name, optional)` pairs, in execution order.
  pub fn new(name: impl Into<String>, step_defs: &[(&str, bool)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(step_name, optional)| StepDef::new(*step_name, *optional))
      .collect();

    Self {
      name: name.into(),
      steps,
      before: HashMap::new(),
      on: HashMap::new(),
      after: HashMap::new(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Step names in execution order.
  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  /// Panics when `step_name` was never declared. Registering a handler for an
  /// unknown step is a wiring mistake, not a runtime condition.
  pub(crate) fn ensure_step_exists(&self, step_name: &str) {
    if !self.steps.iter().any(|s| s.name == step_name) {
      panic!(
        "relay-flow setup error: step '{}' is not declared in pipeline '{}'.",
        step_name, self.name
      );
    }
  }

  pub(crate) fn has_handlers(&self, step_name: &str) -> bool {
    [&self.before, &self.on, &self.after]
      .iter()
      .any(|phase| phase.get(step_name).is_some_and(|v| !v.is_empty()))
  }
}
