// pod-relay/src/services/eligibility.rs

//! Decides whether an order needs the POD provider, and what to send it.
//!
//! In this integration a line item's SKU *is* the POD product id.

use std::collections::HashSet;
use tracing::{debug, instrument, warn};

use crate::models::{LineItem, PodProduct};
use crate::services::pod_client::PodGateway;

/// Line items with a non-empty SKU, mapped 1:1 to POD products, in order.
pub fn classify(line_items: &[LineItem]) -> Vec<PodProduct> {
  line_items
    .iter()
    .filter_map(|item| {
      item.pod_sku().map(|sku| PodProduct {
        id: sku.to_string(),
        quantity: item.quantity,
      })
    })
    .collect()
}

/// True when any line item's SKU is in the provider's current catalog.
///
/// Fails open: if the catalog cannot be fetched the order is treated as eligible,
/// so a POD order is never silently dropped.
#[instrument(name = "eligibility::has_eligible_products", skip_all, fields(line_items = line_items.len()))]
pub async fn has_eligible_products(gateway: &dyn PodGateway, line_items: &[LineItem]) -> bool {
  let catalog = match gateway.list_products().await {
    Ok(catalog) => catalog,
    Err(e) => {
      warn!(error = %e, "Could not fetch POD catalog; assuming the order may contain POD products.");
      return true;
    }
  };
  let known: HashSet<&str> = catalog.iter().map(|p| p.id.as_str()).collect();
  let eligible = line_items
    .iter()
    .filter_map(LineItem::pod_sku)
    .any(|sku| known.contains(sku));
  debug!(catalog_size = known.len(), eligible, "POD eligibility decided.");
  eligible
}
