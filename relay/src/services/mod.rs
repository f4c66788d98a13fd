// pod-relay/src/services/mod.rs

//! Leaf services used by the intake pipeline and the web layer.

pub mod eligibility;
pub mod pod_client;
pub mod signature;
