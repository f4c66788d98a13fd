// pod-relay/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::FulfillmentAttempt;

/// A storefront order as persisted in `shopify_orders`, keyed by the storefront's own order id.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: String,
  pub name: String,
  pub email: Option<String>,
  pub financial_status: Option<String>,
  pub fulfillment_status: Option<String>,
  pub total_price: String, // decimal as sent by the storefront
  pub currency: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub pod_order_id: Option<String>,
  pub pod_status: Option<String>,
  pub pod_sent_at: Option<DateTime<Utc>>,
  /// Webhook body exactly as received.
  #[serde(skip_serializing)]
  pub order_data: String,
}

/// Dashboard view of an order: the row, its payload decoded, and every fulfillment attempt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithAttempts {
  #[serde(flatten)]
  pub order: Order,
  pub order_data: serde_json::Value,
  pub pod_orders: Vec<FulfillmentAttempt>,
}

impl OrderWithAttempts {
  /// Pairs an order with its attempts. A payload that no longer parses is shown as a
  /// plain string rather than failing the whole listing.
  pub fn new(order: Order, pod_orders: Vec<FulfillmentAttempt>) -> Self {
    let order_data = serde_json::from_str(&order.order_data)
      .unwrap_or_else(|_| serde_json::Value::String(order.order_data.clone()));
    Self {
      order,
      order_data,
      pod_orders,
    }
  }
}
