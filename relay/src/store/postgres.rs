// pod-relay/src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use super::schema::SCHEMA_STATEMENTS;
use super::{DispatchOutcome, NewOrder, OrderFilter, OrderPage, OrderStore, Pagination, StoreError, StoreResult};
use crate::models::{FulfillmentAttempt, FulfillmentStatus, Order, OrderWithAttempts, PodProduct};

const ORDER_COLUMNS: &str = "id, name, email, financial_status, fulfillment_status, total_price, currency, \
  created_at, updated_at, pod_order_id, pod_status, pod_sent_at, order_data";

const ATTEMPT_COLUMNS: &str =
  "id, shopify_order_id, pod_api_order_id, status, products, created_at, updated_at, error_message";

#[derive(Debug, FromRow)]
struct AttemptRow {
  id: Uuid,
  shopify_order_id: String,
  pod_api_order_id: Option<String>,
  status: String,
  products: String,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
  error_message: Option<String>,
}

impl TryFrom<AttemptRow> for FulfillmentAttempt {
  type Error = StoreError;

  fn try_from(row: AttemptRow) -> Result<Self, Self::Error> {
    let status = row
      .status
      .parse::<FulfillmentStatus>()
      .map_err(|e| StoreError::InvalidRecord(format!("pod_orders {}: {}", row.id, e)))?;
    let products = serde_json::from_str::<Vec<PodProduct>>(&row.products)
      .map_err(|e| StoreError::InvalidRecord(format!("pod_orders {} products: {}", row.id, e)))?;
    Ok(FulfillmentAttempt {
      id: row.id,
      shopify_order_id: row.shopify_order_id,
      pod_api_order_id: row.pod_api_order_id,
      status,
      products,
      created_at: row.created_at,
      updated_at: row.updated_at,
      error_message: row.error_message,
    })
  }
}

fn filter_clause(filter: OrderFilter) -> &'static str {
  match filter {
    OrderFilter::All => "",
    OrderFilter::HasPodLink => "WHERE pod_order_id IS NOT NULL",
    OrderFilter::NoPodLink => "WHERE pod_order_id IS NULL",
  }
}

fn products_json(products: &[PodProduct]) -> StoreResult<String> {
  serde_json::to_string(products).map_err(|e| StoreError::InvalidRecord(format!("products: {}", e)))
}

/// PostgreSQL-backed [`OrderStore`].
#[derive(Clone)]
pub struct PgOrderStore {
  pool: PgPool,
}

impl PgOrderStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub fn pool(&self) -> &PgPool {
    &self.pool
  }

  async fn insert_attempt<'e, E>(
    executor: E,
    order_id: &str,
    pod_api_order_id: Option<&str>,
    status: FulfillmentStatus,
    products: &[PodProduct],
    error_message: Option<&str>,
  ) -> StoreResult<Uuid>
  where
    E: sqlx::PgExecutor<'e>,
  {
    let attempt_id = Uuid::new_v4();
    sqlx::query(
      "INSERT INTO pod_orders (id, shopify_order_id, pod_api_order_id, status, products, created_at, updated_at, error_message) \
       VALUES ($1, $2, $3, $4, $5, now(), now(), $6)",
    )
    .bind(attempt_id)
    .bind(order_id)
    .bind(pod_api_order_id)
    .bind(status.as_str())
    .bind(products_json(products)?)
    .bind(error_message)
    .execute(executor)
    .await?;
    Ok(attempt_id)
  }

  /// Attempts for the given orders, grouped by order id, newest first.
  async fn attempts_for(&self, order_ids: &[String]) -> StoreResult<HashMap<String, Vec<FulfillmentAttempt>>> {
    let mut grouped: HashMap<String, Vec<FulfillmentAttempt>> = HashMap::new();
    if order_ids.is_empty() {
      return Ok(grouped);
    }
    let rows: Vec<AttemptRow> = sqlx::query_as(&format!(
      "SELECT {} FROM pod_orders WHERE shopify_order_id = ANY($1) ORDER BY created_at DESC",
      ATTEMPT_COLUMNS
    ))
    .bind(order_ids)
    .fetch_all(&self.pool)
    .await?;

    for row in rows {
      let attempt = FulfillmentAttempt::try_from(row)?;
      grouped.entry(attempt.shopify_order_id.clone()).or_default().push(attempt);
    }
    Ok(grouped)
  }
}

#[async_trait]
impl OrderStore for PgOrderStore {
  #[instrument(name = "store::upsert_order", skip(self, order), fields(order_id = %order.id), err(Display))]
  async fn upsert_order(&self, order: &NewOrder) -> StoreResult<()> {
    sqlx::query(
      "INSERT INTO shopify_orders \
         (id, name, email, financial_status, fulfillment_status, total_price, currency, created_at, updated_at, order_data) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
       ON CONFLICT (id) DO UPDATE SET \
         name = EXCLUDED.name, \
         email = EXCLUDED.email, \
         financial_status = EXCLUDED.financial_status, \
         fulfillment_status = EXCLUDED.fulfillment_status, \
         total_price = EXCLUDED.total_price, \
         currency = EXCLUDED.currency, \
         created_at = EXCLUDED.created_at, \
         updated_at = EXCLUDED.updated_at, \
         order_data = EXCLUDED.order_data",
    )
    .bind(&order.id)
    .bind(&order.name)
    .bind(&order.email)
    .bind(&order.financial_status)
    .bind(&order.fulfillment_status)
    .bind(&order.total_price)
    .bind(&order.currency)
    .bind(order.created_at)
    .bind(order.updated_at)
    .bind(&order.order_data)
    .execute(&self.pool)
    .await
    .map_err(|e| {
      error!("Failed to upsert order {}: {}", order.id, e);
      StoreError::Database(e)
    })?;
    debug!("Order upserted.");
    Ok(())
  }

  #[instrument(name = "store::record_dispatch_outcome", skip(self, outcome), fields(status = %outcome.status), err(Display))]
  async fn record_dispatch_outcome(&self, order_id: &str, outcome: &DispatchOutcome) -> StoreResult<()> {
    let mut tx = self.pool.begin().await?;

    let updated = sqlx::query(
      "UPDATE shopify_orders SET pod_order_id = $2, pod_status = $3, pod_sent_at = now() WHERE id = $1",
    )
    .bind(order_id)
    .bind(&outcome.pod_order_id)
    .bind(outcome.status.as_str())
    .execute(&mut *tx)
    .await?;
    if updated.rows_affected() == 0 {
      return Err(StoreError::InvalidRecord(format!("order {} does not exist", order_id)));
    }

    let attempt_id = Self::insert_attempt(
      &mut *tx,
      order_id,
      outcome.pod_order_id.as_deref(),
      outcome.status,
      &outcome.products,
      None,
    )
    .await?;

    tx.commit().await?;
    info!(%attempt_id, pod_order_id = ?outcome.pod_order_id, "Dispatch outcome recorded.");
    Ok(())
  }

  #[instrument(name = "store::record_dispatch_failure", skip(self, products, error_message), err(Display))]
  async fn record_dispatch_failure(
    &self,
    order_id: &str,
    products: &[PodProduct],
    error_message: &str,
  ) -> StoreResult<()> {
    let attempt_id = Self::insert_attempt(
      &self.pool,
      order_id,
      None,
      FulfillmentStatus::Failed,
      products,
      Some(error_message),
    )
    .await?;
    info!(%attempt_id, "Failed dispatch recorded.");
    Ok(())
  }

  #[instrument(name = "store::list_orders", skip(self), err(Display))]
  async fn list_orders(&self, filter: OrderFilter, page: Pagination) -> StoreResult<OrderPage> {
    let where_clause = filter_clause(filter);

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM shopify_orders {}", where_clause))
      .fetch_one(&self.pool)
      .await?;

    let orders: Vec<Order> = sqlx::query_as(&format!(
      "SELECT {} FROM shopify_orders {} ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
      ORDER_COLUMNS, where_clause
    ))
    .bind(i64::from(page.limit))
    .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
    .fetch_all(&self.pool)
    .await?;

    let ids: Vec<String> = orders.iter().map(|o| o.id.clone()).collect();
    let mut attempts = self.attempts_for(&ids).await?;

    let orders = orders
      .into_iter()
      .map(|order| {
        let pod_orders = attempts.remove(&order.id).unwrap_or_default();
        OrderWithAttempts::new(order, pod_orders)
      })
      .collect::<Vec<_>>();
    debug!(returned = orders.len(), total, "Orders listed.");

    Ok(OrderPage {
      orders,
      total: u64::try_from(total).unwrap_or_default(),
    })
  }

  #[instrument(name = "store::find_order", skip(self), err(Display))]
  async fn find_order(&self, order_id: &str) -> StoreResult<Option<OrderWithAttempts>> {
    let order: Option<Order> = sqlx::query_as(&format!("SELECT {} FROM shopify_orders WHERE id = $1", ORDER_COLUMNS))
      .bind(order_id)
      .fetch_optional(&self.pool)
      .await?;
    let Some(order) = order else {
      return Ok(None);
    };
    let mut attempts = self.attempts_for(std::slice::from_ref(&order.id)).await?;
    let pod_orders = attempts.remove(&order.id).unwrap_or_default();
    Ok(Some(OrderWithAttempts::new(order, pod_orders)))
  }

  #[instrument(name = "store::ensure_schema", skip(self), err(Display))]
  async fn ensure_schema(&self) -> StoreResult<()> {
    let mut tx = self.pool.begin().await?;
    for statement in SCHEMA_STATEMENTS {
      sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    info!(statements = SCHEMA_STATEMENTS.len(), "Database schema ensured.");
    Ok(())
  }
}
