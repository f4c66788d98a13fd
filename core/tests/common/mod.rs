// tests/common/mod.rs
#![allow(dead_code)]

use once_cell::sync::Lazy;
use relay_flow::{ContextData, FlowError, PipelineControl};
use tracing::Level;

/// Stand-in for a webhook delivery travelling through a pipeline.
#[derive(Clone, Debug, Default)]
pub struct TestDelivery {
  pub counter: i32,
  pub trail: String,
  pub steps_executed: Vec<String>,
  pub stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("relay-flow error: {0}")]
  Flow(String),

  #[error("Test handler failed: {0}")]
  Handler(String),
}

impl From<FlowError> for TestError {
  fn from(fe: FlowError) -> Self {
    TestError::Flow(format!("{:?}", fe))
  }
}

pub fn create_simple_handler(
  step_name: &'static str,
  trail_to_append: &'static str,
) -> relay_flow::Handler<TestDelivery, TestError> {
  Box::new(move |ctx: ContextData<TestDelivery>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.counter += 1;
      guard.trail.push_str(trail_to_append);
      guard.steps_executed.push(step_name.to_string());
      tracing::debug!(target: "test_handlers", step = step_name, "executed, counter: {}", guard.counter);
      if guard.stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

pub fn create_failing_handler(
  step_name: &'static str,
  error_message: &'static str,
) -> relay_flow::Handler<TestDelivery, TestError> {
  Box::new(move |ctx: ContextData<TestDelivery>| {
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name.to_string());
      Err(TestError::Handler(error_message.to_string()))
    })
  })
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
