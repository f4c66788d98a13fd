// pod-relay/src/web/handlers/webhook_handlers.rs

use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use tracing::{error, info, instrument};

use crate::errors::AppError;
use crate::pipelines::OrderIntakeCtxData;
use crate::services::signature::SIGNATURE_HEADER;
use crate::state::AppState;
use relay_flow::{ContextData, PipelineResult};

/// `POST /api/webhooks/orders/paid`.
///
/// The body is taken as raw bytes: the signature covers them exactly as sent.
#[instrument(name = "handler::orders_paid_webhook", skip_all, fields(payload_len = body.len()))]
pub async fn orders_paid_webhook_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  body: web::Bytes,
) -> Result<HttpResponse, AppError> {
  let signature_header = req
    .headers()
    .get(SIGNATURE_HEADER)
    .and_then(|h_val| h_val.to_str().ok())
    .map(String::from);

  let intake_ctx = OrderIntakeCtxData::new(
    app_state.store.clone(),
    app_state.gateway.clone(),
    app_state.config.webhook_secret.clone(),
    body,
    signature_header,
  );
  let ctx_data = ContextData::new(intake_ctx);

  match app_state.intake_pipeline.run(ctx_data.clone()).await {
    Ok(result) => {
      let guard = ctx_data.read();
      match &result {
        PipelineResult::Completed => info!(
          order_id = ?guard.order_id,
          stage = %guard.stage,
          "Webhook processed."
        ),
        PipelineResult::Stopped { at_step } => info!(
          order_id = ?guard.order_id,
          stage = %guard.stage,
          %at_step,
          "Webhook processed without dispatch."
        ),
      }
      Ok(HttpResponse::Ok().json(json!({ "success": true })))
    }
    Err(app_err) => {
      error!(stage = %ctx_data.read().stage, "Webhook processing failed: {}", app_err);
      Err(app_err)
    }
  }
}
