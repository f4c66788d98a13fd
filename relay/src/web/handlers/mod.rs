// pod-relay/src/web/handlers/mod.rs

pub mod order_handlers;
pub mod pod_handlers;
pub mod setup_handlers;
pub mod webhook_handlers;
