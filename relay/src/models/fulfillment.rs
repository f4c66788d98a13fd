// pod-relay/src/models/fulfillment.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::models::PodProduct;

/// Status of a dispatch to the POD provider, shared by orders and attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FulfillmentStatus {
  Pending,
  Sent,
  Failed,
  Processing,
  Completed,
}

impl FulfillmentStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      FulfillmentStatus::Pending => "pending",
      FulfillmentStatus::Sent => "sent",
      FulfillmentStatus::Failed => "failed",
      FulfillmentStatus::Processing => "processing",
      FulfillmentStatus::Completed => "completed",
    }
  }

  /// Maps the free-form status returned by the gateway. An absent status means the
  /// order was accepted (`sent`); unknown values are treated the same way.
  pub fn from_gateway(status: Option<&str>) -> Self {
    match status.map(str::trim) {
      None | Some("") => FulfillmentStatus::Sent,
      Some(raw) => raw.parse().unwrap_or_else(|_| {
        tracing::warn!(gateway_status = raw, "Unrecognised POD status, recording as 'sent'.");
        FulfillmentStatus::Sent
      }),
    }
  }
}

impl fmt::Display for FulfillmentStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown fulfillment status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for FulfillmentStatus {
  type Err = UnknownStatus;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "pending" => Ok(FulfillmentStatus::Pending),
      "sent" => Ok(FulfillmentStatus::Sent),
      "failed" => Ok(FulfillmentStatus::Failed),
      "processing" => Ok(FulfillmentStatus::Processing),
      "completed" => Ok(FulfillmentStatus::Completed),
      _ => Err(UnknownStatus(s.to_string())),
    }
  }
}

/// One dispatch decision for an order (`pod_orders` table). Never mutated after insert.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentAttempt {
  pub id: Uuid,
  pub shopify_order_id: String,
  pub pod_api_order_id: Option<String>,
  pub status: FulfillmentStatus,
  pub products: Vec<PodProduct>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub error_message: Option<String>,
}
