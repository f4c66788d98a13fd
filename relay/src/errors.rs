// pod-relay/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::services::pod_client::GatewayError;
use crate::store::StoreError;
use relay_flow::FlowError;

#[derive(Debug, Error)]
pub enum AppError {
  /// Missing or invalid webhook signature. Nothing has been written.
  #[error("Unauthorized: {0}")]
  Unauthorized(String),

  /// The webhook body passed signature checks but is not a valid order payload.
  #[error("Malformed order payload: {0}")]
  MalformedPayload(String),

  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Store Error: {0}")]
  Store(#[from] StoreError),

  #[error("POD Gateway Error: {0}")]
  Gateway(#[from] GatewayError),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<StoreError>() {
      Ok(store_err) => AppError::Store(store_err),
      Err(err) => AppError::Internal(err.to_string()),
    }
  }
}

impl From<sqlx::Error> for AppError {
  fn from(err: sqlx::Error) -> Self {
    AppError::Store(StoreError::Database(err))
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Gateway(_) => StatusCode::BAD_GATEWAY,
      AppError::MalformedPayload(_)
      | AppError::Config(_)
      | AppError::Store(_)
      | AppError::Workflow { .. }
      | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    tracing::error!(application_error = %self, "Responding with error");
    let status = self.status_code();
    match self {
      AppError::Unauthorized(_) => HttpResponse::build(status).json(json!({"error": "Unauthorized"})),
      AppError::Validation(m) | AppError::NotFound(m) => HttpResponse::build(status).json(json!({"error": m})),
      AppError::Gateway(e) => {
        HttpResponse::build(status).json(json!({"error": "POD provider error", "detail": e.to_string()}))
      }
      // Webhook callers only ever see a generic message for server-side failures.
      _ => HttpResponse::build(status).json(json!({"error": "Internal server error"})),
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::body::to_bytes;

  async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
    let resp = err.error_response();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body()).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  #[actix_web::test]
  async fn unauthorized_maps_to_401_without_detail() {
    let (status, body) = body_json(AppError::Unauthorized("signature mismatch".into())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Unauthorized"}));
  }

  #[actix_web::test]
  async fn malformed_payload_is_a_server_error() {
    let (status, body) = body_json(AppError::MalformedPayload("expected value at line 1".into())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Internal server error"}));
  }

  #[actix_web::test]
  async fn store_errors_hide_database_details() {
    let (status, body) = body_json(AppError::Store(StoreError::InvalidRecord("bad status".into()))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
  }

  #[actix_web::test]
  async fn gateway_errors_map_to_bad_gateway() {
    let err = GatewayError::Status {
      status: 503,
      message: "maintenance".into(),
    };
    let (status, body) = body_json(AppError::Gateway(err)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["detail"], "POD API Error: 503 - maintenance");
  }

  #[test]
  fn anyhow_wrapping_a_store_error_keeps_its_kind() {
    let err = anyhow::Error::new(StoreError::InvalidRecord("x".into()));
    assert!(matches!(AppError::from(err), AppError::Store(_)));
  }
}
