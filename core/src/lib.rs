// relay-flow/src/lib.rs

//! relay-flow: a small asynchronous step-pipeline engine.
//!
//! A pipeline is an ordered list of named steps. Each step may carry `before`, `on`
//! and `after` handlers; every handler receives a clone of the shared
//! [`ContextData`] and answers with [`PipelineControl::Continue`] or
//! [`PipelineControl::Stop`]. The first handler error aborts the run.
//!
//! The POD relay drives its webhook intake flow (verify, parse, persist, classify,
//! dispatch, record) through one of these pipelines.

pub mod core;
pub mod error;
pub mod pipeline;

pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::handler::Handler;
pub use crate::core::step::StepDef;

pub use crate::pipeline::definition::Pipeline;

pub use crate::error::FlowError;
