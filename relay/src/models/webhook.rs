// pod-relay/src/models/webhook.rs

//! The `orders/paid` webhook body sent by the storefront.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::lenient::lenient;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopifyOrderPayload {
  pub id: u64,
  pub name: String,
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub financial_status: Option<String>,
  #[serde(default)]
  pub fulfillment_status: Option<String>,
  pub total_price: String,
  pub currency: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  #[serde(default)]
  pub line_items: Vec<LineItem>,
  // Informational; an unexpected shape decodes as None.
  #[serde(default, deserialize_with = "lenient")]
  pub customer: Option<Customer>,
  #[serde(default, deserialize_with = "lenient")]
  pub shipping_address: Option<ShippingAddress>,
}

impl ShopifyOrderPayload {
  /// The storefront id as stored (`shopify_orders.id`).
  pub fn order_id(&self) -> String {
    self.id.to_string()
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
  #[serde(default)]
  pub id: Option<u64>,
  #[serde(default)]
  pub product_id: Option<u64>,
  #[serde(default)]
  pub variant_id: Option<u64>,
  #[serde(default)]
  pub title: Option<String>,
  pub quantity: u32,
  #[serde(default)]
  pub price: Option<String>,
  /// Doubles as the POD product id for print-on-demand items.
  #[serde(default)]
  pub sku: Option<String>,
}

impl LineItem {
  /// The SKU when present and non-empty.
  pub fn pod_sku(&self) -> Option<&str> {
    self.sku.as_deref().filter(|sku| !sku.is_empty())
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
  #[serde(default)]
  pub id: Option<u64>,
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub first_name: Option<String>,
  #[serde(default)]
  pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingAddress {
  #[serde(default)]
  pub first_name: Option<String>,
  #[serde(default)]
  pub last_name: Option<String>,
  #[serde(default)]
  pub address1: Option<String>,
  #[serde(default)]
  pub address2: Option<String>,
  #[serde(default)]
  pub city: Option<String>,
  #[serde(default)]
  pub province: Option<String>,
  #[serde(default)]
  pub country: Option<String>,
  #[serde(default)]
  pub zip: Option<String>,
  #[serde(default)]
  pub phone: Option<String>,
}
