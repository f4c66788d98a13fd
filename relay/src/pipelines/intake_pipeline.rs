// pod-relay/src/pipelines/intake_pipeline.rs

use relay_flow::{ContextData, PipelineControl};
use tracing::{error, info, instrument, warn};

use crate::errors::AppError;
use crate::models::{FulfillmentStatus, ShopifyOrderPayload};
use crate::pipelines::contexts::{IntakeStage, OrderIntakeCtxData};
use crate::pipelines::IntakePipeline;
use crate::services::{eligibility, signature};
use crate::store::{DispatchOutcome, NewOrder};

pub const INTAKE_PIPELINE_NAME: &str = "order_intake";

pub const STEP_VERIFY_SIGNATURE: &str = "verify_webhook_signature";
pub const STEP_PARSE_PAYLOAD: &str = "parse_order_payload";
pub const STEP_PERSIST_ORDER: &str = "persist_order";
pub const STEP_CLASSIFY: &str = "classify_pod_eligibility";
pub const STEP_DISPATCH: &str = "dispatch_pod_order";
pub const STEP_RECORD_OUTCOME: &str = "record_dispatch_outcome";

type StepResult = Result<PipelineControl, AppError>;

/// Builds the webhook intake pipeline:
/// verify → parse → persist → classify → dispatch → record.
pub fn build_intake_pipeline() -> IntakePipeline {
  let mut p = IntakePipeline::new(
    INTAKE_PIPELINE_NAME,
    &[
      (STEP_VERIFY_SIGNATURE, false),
      (STEP_PARSE_PAYLOAD, false),
      (STEP_PERSIST_ORDER, false),
      (STEP_CLASSIFY, false),
      (STEP_DISPATCH, false),
      (STEP_RECORD_OUTCOME, false),
    ],
  );

  p.on_root(STEP_VERIFY_SIGNATURE, verify_webhook_signature);
  p.on_root(STEP_PARSE_PAYLOAD, parse_order_payload);
  p.on_root(STEP_PERSIST_ORDER, persist_order);
  p.on_root(STEP_CLASSIFY, classify_pod_eligibility);
  p.on_root(STEP_DISPATCH, dispatch_pod_order);
  p.on_root(STEP_RECORD_OUTCOME, record_dispatch_outcome);

  p
}

async fn verify_webhook_signature(ctx_data: ContextData<OrderIntakeCtxData>) -> StepResult {
  let verified = ctx_data.with(|ctx| {
    let (Some(secret), Some(supplied)) = (ctx.webhook_secret.as_deref(), ctx.signature_header.as_deref()) else {
      return false;
    };
    signature::verify(&ctx.raw_payload, supplied, secret.as_bytes())
  });

  if !verified {
    warn!("Intake: webhook signature missing or invalid, rejecting delivery.");
    return Err(AppError::Unauthorized("webhook signature verification failed".to_string()));
  }

  ctx_data.write().stage = IntakeStage::Verified;
  Ok(PipelineControl::Continue)
}

async fn parse_order_payload(ctx_data: ContextData<OrderIntakeCtxData>) -> StepResult {
  let raw_payload = ctx_data.read().raw_payload.clone();

  let payload = serde_json::from_slice::<ShopifyOrderPayload>(&raw_payload).map_err(|e| {
    error!("Intake: payload passed signature checks but is not a valid order: {}", e);
    AppError::MalformedPayload(e.to_string())
  })?;

  info!(
    order_id = payload.id,
    order_name = %payload.name,
    line_items = payload.line_items.len(),
    "Intake: order payload parsed."
  );
  let mut guard = ctx_data.write();
  guard.order_id = Some(payload.order_id());
  guard.payload = Some(payload);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "intake::persist_order", skip_all)]
async fn persist_order(ctx_data: ContextData<OrderIntakeCtxData>) -> StepResult {
  let (store, new_order) = {
    let guard = ctx_data.read();
    let payload = guard
      .payload
      .as_ref()
      .ok_or_else(|| AppError::Internal("persist_order ran without a parsed payload".to_string()))?;
    // Bodies that are not UTF-8 never reach this point: they fail JSON parsing.
    let raw_body = String::from_utf8_lossy(&guard.raw_payload);
    (guard.store.clone(), NewOrder::from_payload(payload, &raw_body))
  };

  store.upsert_order(&new_order).await?;

  info!(order_id = %new_order.id, "Intake: order persisted.");
  ctx_data.write().stage = IntakeStage::Persisted;
  Ok(PipelineControl::Continue)
}

#[instrument(name = "intake::classify_pod_eligibility", skip_all)]
async fn classify_pod_eligibility(ctx_data: ContextData<OrderIntakeCtxData>) -> StepResult {
  let (gateway, line_items) = {
    let guard = ctx_data.read();
    let line_items = guard
      .payload
      .as_ref()
      .map(|p| p.line_items.clone())
      .unwrap_or_default();
    (guard.gateway.clone(), line_items)
  };

  if !eligibility::has_eligible_products(gateway.as_ref(), &line_items).await {
    info!("Intake: order has no POD products, skipping dispatch.");
    ctx_data.write().stage = IntakeStage::Skipped;
    return Ok(PipelineControl::Stop);
  }

  let pod_products = eligibility::classify(&line_items);
  if pod_products.is_empty() {
    // Possible when the catalog was unavailable and the order carries no SKUs.
    info!("Intake: no line item carries a SKU, skipping dispatch.");
    ctx_data.write().stage = IntakeStage::Skipped;
    return Ok(PipelineControl::Stop);
  }

  info!(products = pod_products.len(), "Intake: order classified for POD dispatch.");
  let mut guard = ctx_data.write();
  guard.pod_products = pod_products;
  guard.stage = IntakeStage::Classified;
  Ok(PipelineControl::Continue)
}

#[instrument(name = "intake::dispatch_pod_order", skip_all)]
async fn dispatch_pod_order(ctx_data: ContextData<OrderIntakeCtxData>) -> StepResult {
  let (gateway, products) = ctx_data.with(|ctx| (ctx.gateway.clone(), ctx.pod_products.clone()));

  // A gateway failure is an outcome to record, not a failed delivery.
  let result = match gateway.create_order(&products).await {
    Ok(receipt) => Ok(receipt),
    Err(e) => {
      warn!(error = %e, "Intake: POD dispatch failed.");
      Err(e.to_string())
    }
  };

  ctx_data.write().dispatch_result = Some(result);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "intake::record_dispatch_outcome", skip_all)]
async fn record_dispatch_outcome(ctx_data: ContextData<OrderIntakeCtxData>) -> StepResult {
  let (store, order_id, products, dispatch_result) = {
    let guard = ctx_data.read();
    let order_id = guard
      .order_id
      .clone()
      .ok_or_else(|| AppError::Internal("record_dispatch_outcome ran without an order id".to_string()))?;
    let dispatch_result = guard
      .dispatch_result
      .clone()
      .ok_or_else(|| AppError::Internal("record_dispatch_outcome ran before dispatch".to_string()))?;
    (guard.store.clone(), order_id, guard.pod_products.clone(), dispatch_result)
  };

  let stage = match dispatch_result {
    Ok(receipt) => {
      let outcome = DispatchOutcome {
        pod_order_id: receipt.id.clone(),
        status: FulfillmentStatus::from_gateway(receipt.status.as_deref()),
        products,
      };
      store.record_dispatch_outcome(&order_id, &outcome).await?;
      info!(
        %order_id,
        pod_order_id = ?outcome.pod_order_id,
        pod_status = %outcome.status,
        "Intake: order dispatched to POD."
      );
      IntakeStage::Dispatched
    }
    Err(message) => {
      store.record_dispatch_failure(&order_id, &products, &message).await?;
      info!(%order_id, "Intake: failed dispatch recorded.");
      IntakeStage::DispatchFailed
    }
  };

  ctx_data.write().stage = stage;
  Ok(PipelineControl::Continue)
}
