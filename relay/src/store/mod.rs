// pod-relay/src/store/mod.rs

//! Persistence of orders and their fulfillment attempts.

pub mod postgres;
pub mod schema;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{FulfillmentStatus, OrderWithAttempts, PodProduct, ShopifyOrderPayload};

pub use postgres::PgOrderStore;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("stored record is invalid: {0}")]
  InvalidRecord(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Mutable order fields written on every webhook delivery.
/// The POD link (`pod_order_id`, `pod_status`, `pod_sent_at`) is deliberately absent.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
  pub id: String,
  pub name: String,
  pub email: Option<String>,
  pub financial_status: Option<String>,
  pub fulfillment_status: Option<String>,
  pub total_price: String,
  pub currency: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub order_data: String,
}

impl NewOrder {
  /// Builds the row from a parsed payload. `raw_body` is stored verbatim as `order_data`.
  pub fn from_payload(payload: &ShopifyOrderPayload, raw_body: &str) -> Self {
    let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());
    Self {
      id: payload.order_id(),
      name: payload.name.clone(),
      email: non_empty(&payload.email),
      financial_status: non_empty(&payload.financial_status),
      fulfillment_status: non_empty(&payload.fulfillment_status),
      total_price: payload.total_price.clone(),
      currency: payload.currency.clone(),
      created_at: payload.created_at,
      updated_at: payload.updated_at,
      order_data: raw_body.to_string(),
    }
  }
}

/// A successful dispatch, as written to both the order and a new attempt row.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
  pub pod_order_id: Option<String>,
  pub status: FulfillmentStatus,
  pub products: Vec<PodProduct>,
}

/// Which orders a listing returns, keyed on whether `pod_order_id` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderFilter {
  #[default]
  All,
  HasPodLink,
  NoPodLink,
}

impl OrderFilter {
  /// `pod` and `no-pod` select a subset; anything else (or nothing) lists all orders.
  pub fn from_query(status: Option<&str>) -> Self {
    match status {
      Some("pod") => OrderFilter::HasPodLink,
      Some("no-pod") => OrderFilter::NoPodLink,
      _ => OrderFilter::All,
    }
  }

  pub fn matches(&self, pod_order_id: Option<&str>) -> bool {
    match self {
      OrderFilter::All => true,
      OrderFilter::HasPodLink => pod_order_id.is_some(),
      OrderFilter::NoPodLink => pod_order_id.is_none(),
    }
  }
}

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 250;

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
  pub page: u32,
  pub limit: u32,
}

impl Default for Pagination {
  fn default() -> Self {
    Self {
      page: 1,
      limit: DEFAULT_PAGE_SIZE,
    }
  }
}

impl Pagination {
  /// `None` when `page` or `limit` is zero. `limit` is capped at `MAX_PAGE_SIZE`.
  pub fn new(page: u32, limit: u32) -> Option<Self> {
    if page == 0 || limit == 0 {
      return None;
    }
    Some(Self {
      page,
      limit: limit.min(MAX_PAGE_SIZE),
    })
  }

  pub fn offset(&self) -> u64 {
    u64::from(self.page - 1) * u64::from(self.limit)
  }

  /// Number of pages needed for `total` rows.
  pub fn pages(&self, total: u64) -> u64 {
    total.div_ceil(u64::from(self.limit))
  }
}

/// One page of orders plus the filter's total row count.
#[derive(Debug, Clone)]
pub struct OrderPage {
  pub orders: Vec<OrderWithAttempts>,
  pub total: u64,
}

/// Durable storage for orders and fulfillment attempts.
///
/// Every call goes to the backing store; implementations keep no cache.
#[async_trait]
pub trait OrderStore: Send + Sync {
  /// Inserts the order or overwrites its mutable fields, atomically per order id.
  /// The POD link columns are left as they are.
  async fn upsert_order(&self, order: &NewOrder) -> StoreResult<()>;

  /// Sets the order's POD link (`pod_sent_at = now`) and inserts a matching attempt.
  async fn record_dispatch_outcome(&self, order_id: &str, outcome: &DispatchOutcome) -> StoreResult<()>;

  /// Inserts a `failed` attempt carrying `error_message`; the order itself is untouched.
  async fn record_dispatch_failure(
    &self,
    order_id: &str,
    products: &[PodProduct],
    error_message: &str,
  ) -> StoreResult<()>;

  /// Orders by `created_at` descending, with all of their attempts (newest first).
  async fn list_orders(&self, filter: OrderFilter, page: Pagination) -> StoreResult<OrderPage>;

  async fn find_order(&self, order_id: &str) -> StoreResult<Option<OrderWithAttempts>>;

  /// Creates the relay's tables if they do not exist yet.
  async fn ensure_schema(&self) -> StoreResult<()>;
}
