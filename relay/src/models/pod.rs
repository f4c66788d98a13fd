// pod-relay/src/models/pod.rs

//! Shapes exchanged with the print-on-demand provider.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::models::lenient::{lenient, lenient_list};

/// A product line in a POD order request: `{"id": <sku>, "quantity": n}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodProduct {
  pub id: String,
  pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodVariant {
  #[serde(default, deserialize_with = "opt_string_or_number")]
  pub id: Option<String>,
  #[serde(default, deserialize_with = "lenient")]
  pub name: Option<String>,
  /// Passed through as sent; the provider uses both strings and numbers.
  #[serde(default)]
  pub price: Option<Value>,
  #[serde(default, deserialize_with = "lenient")]
  pub sku: Option<String>,
}

/// An entry of the provider's product catalog (`GET /products`).
///
/// Only `id` is required; catalog membership is decided by id alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodCatalogProduct {
  #[serde(deserialize_with = "string_or_number")]
  pub id: String,
  #[serde(default, deserialize_with = "lenient")]
  pub name: Option<String>,
  #[serde(default, deserialize_with = "lenient")]
  pub description: Option<String>,
  #[serde(default)]
  pub price: Option<Value>,
  #[serde(default, deserialize_with = "lenient_list")]
  pub variants: Vec<PodVariant>,
}

/// The provider's view of an order, as returned by `POST /orders` and `GET /orders[/{id}]`.
/// Fields the relay does not interpret are kept in `extra` so passthrough reads lose nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PodOrderResponse {
  #[serde(default, deserialize_with = "opt_string_or_number", skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreatePodOrderRequest<'a> {
  pub products: &'a [PodProduct],
}

// The provider is not consistent about string vs numeric ids.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  match Value::deserialize(deserializer)? {
    Value::String(s) => Ok(s),
    Value::Number(n) => Ok(n.to_string()),
    other => Err(serde::de::Error::custom(format!("expected string or number id, got {}", other))),
  }
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  match Option::<Value>::deserialize(deserializer)? {
    Some(Value::String(s)) => Ok(Some(s)),
    Some(Value::Number(n)) => Ok(Some(n.to_string())),
    _ => Ok(None),
  }
}
