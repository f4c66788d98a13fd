// pod-relay/src/state.rs
use crate::config::AppConfig;
use crate::pipelines::{build_intake_pipeline, IntakePipeline};
use crate::services::pod_client::PodGateway;
use crate::store::OrderStore;
use std::sync::Arc;

/// Shared by every request. Built once at startup.
#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn OrderStore>,
  pub gateway: Arc<dyn PodGateway>,
  pub intake_pipeline: Arc<IntakePipeline>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  pub fn new(store: Arc<dyn OrderStore>, gateway: Arc<dyn PodGateway>, config: Arc<AppConfig>) -> Self {
    Self {
      store,
      gateway,
      intake_pipeline: Arc::new(build_intake_pipeline()),
      config,
    }
  }
}
