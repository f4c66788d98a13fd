// pod-relay/src/web/handlers/setup_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::services::signature::SIGNATURE_HEADER;
use crate::state::AppState;

/// `GET /api/setup`: what the relay exposes and what it needs configured.
#[instrument(name = "handler::describe_setup", skip(app_state))]
pub async fn describe_setup_handler(app_state: web::Data<AppState>) -> HttpResponse {
  let config = &app_state.config;
  HttpResponse::Ok().json(json!({
    "webhook": {
      "topic": "orders/paid",
      "path": "/api/webhooks/orders/paid",
      "signatureHeader": SIGNATURE_HEADER,
      "secretConfigured": config.webhook_secret.is_some(),
    },
    "podApiUrl": config.pod_api_url,
    "environment": [
      "DATABASE_URL",
      "SHOPIFY_WEBHOOK_SECRET",
      "POD_API_URL",
      "POD_API_KEY",
    ],
    "endpoints": [
      "GET /api/orders",
      "GET /api/orders/{id}",
      "GET /api/pod/products",
      "GET /api/pod/orders",
      "GET /api/pod/orders/{id}",
      "POST /api/setup",
    ],
  }))
}

/// `POST /api/setup`: creates missing tables.
#[instrument(name = "handler::run_setup", skip(app_state))]
pub async fn run_setup_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  app_state.store.ensure_schema().await?;
  info!("Database schema set up.");
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Database schema is up to date.",
  })))
}
