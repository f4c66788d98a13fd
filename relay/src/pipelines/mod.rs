// pod-relay/src/pipelines/mod.rs

//! relay-flow pipelines used by the relay.

use crate::errors::AppError;
use relay_flow::Pipeline;

pub mod contexts;
pub mod intake_pipeline;

pub use contexts::{IntakeStage, OrderIntakeCtxData};
pub use intake_pipeline::build_intake_pipeline;

pub type IntakePipeline = Pipeline<OrderIntakeCtxData, AppError>;
