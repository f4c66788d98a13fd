// pod-relay/src/models/lenient.rs

//! Field decoders for payloads whose optional fields arrive with inconsistent types.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Any value that does not decode as `T` becomes `None` instead of failing the record.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
  D: Deserializer<'de>,
  T: DeserializeOwned,
{
  let value = Value::deserialize(deserializer)?;
  Ok(serde_json::from_value(value).ok())
}

/// Keeps the elements that decode as `T`; a non-array value is an empty list.
pub(crate) fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
  D: Deserializer<'de>,
  T: DeserializeOwned,
{
  match Value::deserialize(deserializer)? {
    Value::Array(items) => Ok(items.into_iter().filter_map(|item| serde_json::from_value(item).ok()).collect()),
    _ => Ok(Vec::new()),
  }
}
