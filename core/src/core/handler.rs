// relay-flow/src/core/handler.rs

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use std::future::Future;
use std::pin::Pin;

/// A boxed asynchronous step handler.
///
/// Handlers take a clone of the pipeline's `ContextData<TData>` and must drop any
/// lock guard before their first `.await`.
pub type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>>
    + Send
    + Sync,
>;
