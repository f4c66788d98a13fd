// pod-relay/src/models/mod.rs

//! Data structures for stored records, the inbound webhook payload and the POD provider's API.

pub mod fulfillment;
mod lenient;
pub mod order;
pub mod pod;
pub mod webhook;

pub use fulfillment::{FulfillmentAttempt, FulfillmentStatus};
pub use order::{Order, OrderWithAttempts};
pub use pod::{PodCatalogProduct, PodOrderResponse, PodProduct};
pub use webhook::{LineItem, ShopifyOrderPayload};
