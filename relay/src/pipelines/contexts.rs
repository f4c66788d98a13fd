// pod-relay/src/pipelines/contexts.rs

//! Context data carried through the intake pipeline.
//! Handlers receive it wrapped in `relay_flow::ContextData`.

use actix_web::web::Bytes;
use std::fmt;
use std::sync::Arc;

use crate::models::{PodOrderResponse, PodProduct, ShopifyOrderPayload};
use crate::services::pod_client::PodGateway;
use crate::store::OrderStore;

/// How far a delivery got. The last three variants are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeStage {
  Unverified,
  Verified,
  Persisted,
  Classified,
  Dispatched,
  Skipped,
  DispatchFailed,
}

impl IntakeStage {
  pub fn is_terminal(&self) -> bool {
    matches!(
      self,
      IntakeStage::Dispatched | IntakeStage::Skipped | IntakeStage::DispatchFailed
    )
  }
}

impl fmt::Display for IntakeStage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      IntakeStage::Unverified => "unverified",
      IntakeStage::Verified => "verified",
      IntakeStage::Persisted => "persisted",
      IntakeStage::Classified => "classified",
      IntakeStage::Dispatched => "dispatched",
      IntakeStage::Skipped => "skipped",
      IntakeStage::DispatchFailed => "dispatch_failed",
    };
    f.write_str(s)
  }
}

/// One webhook delivery as it moves through the intake pipeline.
#[derive(Clone)]
pub struct OrderIntakeCtxData {
  pub store: Arc<dyn OrderStore>,
  pub gateway: Arc<dyn PodGateway>,
  pub webhook_secret: Option<String>,

  /// Request body exactly as received. Signatures are checked against these bytes.
  pub raw_payload: Bytes,
  pub signature_header: Option<String>,

  // Filled in by the pipeline:
  pub stage: IntakeStage,
  pub payload: Option<ShopifyOrderPayload>,
  pub order_id: Option<String>,
  pub pod_products: Vec<PodProduct>,
  /// Gateway receipt, or the gateway error's display text.
  pub dispatch_result: Option<Result<PodOrderResponse, String>>,
}

impl OrderIntakeCtxData {
  pub fn new(
    store: Arc<dyn OrderStore>,
    gateway: Arc<dyn PodGateway>,
    webhook_secret: Option<String>,
    raw_payload: Bytes,
    signature_header: Option<String>,
  ) -> Self {
    Self {
      store,
      gateway,
      webhook_secret,
      raw_payload,
      signature_header,
      stage: IntakeStage::Unverified,
      payload: None,
      order_id: None,
      pod_products: Vec::new(),
      dispatch_result: None,
    }
  }
}

impl fmt::Debug for OrderIntakeCtxData {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("OrderIntakeCtxData")
      .field("payload_len", &self.raw_payload.len())
      .field("has_signature", &self.signature_header.is_some())
      .field("stage", &self.stage)
      .field("order_id", &self.order_id)
      .field("pod_products", &self.pod_products)
      .field("dispatch_result", &self.dispatch_result)
      .finish()
  }
}
