// tests/common/mod.rs
#![allow(dead_code)]

use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use uuid::Uuid;

use pod_relay::models::{
  FulfillmentAttempt, FulfillmentStatus, Order, OrderWithAttempts, PodCatalogProduct, PodOrderResponse, PodProduct,
};
use pod_relay::services::pod_client::{GatewayError, PodGateway};
use pod_relay::services::signature::compute_signature;
use pod_relay::store::{
  DispatchOutcome, NewOrder, OrderFilter, OrderPage, OrderStore, Pagination, StoreError, StoreResult,
};
use pod_relay::{AppConfig, AppState};

pub const TEST_SECRET: &str = "shpss_integration_secret";

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Configuration & state ---

pub fn test_config(webhook_secret: Option<&str>) -> AppConfig {
  AppConfig {
    server_host: "127.0.0.1".to_string(),
    server_port: 0,
    database_url: "postgres://unused".to_string(),
    database_max_connections: 1,
    webhook_secret: webhook_secret.map(String::from),
    pod_api_url: "http://127.0.0.1:9".to_string(),
    pod_api_key: "test-key".to_string(),
    init_schema: false,
  }
}

pub fn test_state(store: Arc<MemoryOrderStore>, gateway: Arc<dyn PodGateway>) -> AppState {
  AppState::new(store, gateway, Arc::new(test_config(Some(TEST_SECRET))))
}

// --- Payloads ---

pub fn order_created_at(minutes: i64) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).single().unwrap_or_default() + ChronoDuration::minutes(minutes)
}

/// A paid-order webhook body with one line item per `(sku, quantity)`; an empty SKU
/// produces a line item without one.
pub fn order_payload(order_id: u64, line_items: &[(&str, u32)]) -> Value {
  let items: Vec<Value> = line_items
    .iter()
    .enumerate()
    .map(|(idx, (sku, quantity))| {
      let sku = if sku.is_empty() { Value::Null } else { json!(sku) };
      json!({
        "id": 9000 + idx as u64,
        "product_id": 7000 + idx as u64,
        "title": format!("Item {}", idx + 1),
        "quantity": quantity,
        "price": "10.00",
        "sku": sku,
      })
    })
    .collect();
  json!({
    "id": order_id,
    "name": format!("#{}", order_id),
    "email": "buyer@example.com",
    "financial_status": "paid",
    "fulfillment_status": null,
    "total_price": "20.00",
    "currency": "EUR",
    "created_at": "2024-03-01T10:00:00+02:00",
    "updated_at": "2024-03-01T10:05:00+02:00",
    "line_items": items,
    "customer": {"id": 42, "email": "buyer@example.com", "first_name": "Ona", "last_name": "Jonaitis"},
  })
}

pub fn sign(body: &[u8]) -> String {
  compute_signature(body, TEST_SECRET.as_bytes())
}

pub fn new_order(order_id: &str, created_at: DateTime<Utc>) -> NewOrder {
  NewOrder {
    id: order_id.to_string(),
    name: format!("#{}", order_id),
    email: None,
    financial_status: Some("paid".to_string()),
    fulfillment_status: None,
    total_price: "5.00".to_string(),
    currency: "EUR".to_string(),
    created_at,
    updated_at: created_at,
    order_data: json!({"id": order_id}).to_string(),
  }
}

// --- In-memory order store ---

/// `OrderStore` kept in process memory. Attempts are kept in insertion order.
#[derive(Default)]
pub struct MemoryOrderStore {
  orders: Mutex<Vec<Order>>,
  attempts: Mutex<Vec<FulfillmentAttempt>>,
  fail_writes: Mutex<bool>,
}

impl MemoryOrderStore {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  /// Every later write fails with a store error.
  pub fn fail_writes(&self) {
    *self.fail_writes.lock() = true;
  }

  pub fn orders(&self) -> Vec<Order> {
    self.orders.lock().clone()
  }

  pub fn order(&self, order_id: &str) -> Option<Order> {
    self.orders.lock().iter().find(|o| o.id == order_id).cloned()
  }

  pub fn attempts(&self) -> Vec<FulfillmentAttempt> {
    self.attempts.lock().clone()
  }

  fn check_writable(&self) -> StoreResult<()> {
    if *self.fail_writes.lock() {
      return Err(StoreError::InvalidRecord("store is read-only in this test".to_string()));
    }
    Ok(())
  }

  fn push_attempt(
    &self,
    order_id: &str,
    pod_api_order_id: Option<String>,
    status: FulfillmentStatus,
    products: &[PodProduct],
    error_message: Option<String>,
  ) {
    let now = Utc::now();
    self.attempts.lock().push(FulfillmentAttempt {
      id: Uuid::new_v4(),
      shopify_order_id: order_id.to_string(),
      pod_api_order_id,
      status,
      products: products.to_vec(),
      created_at: now,
      updated_at: now,
      error_message,
    });
  }

  fn with_attempts(&self, order: Order) -> OrderWithAttempts {
    let attempts: Vec<FulfillmentAttempt> = self
      .attempts
      .lock()
      .iter()
      .rev()
      .filter(|a| a.shopify_order_id == order.id)
      .cloned()
      .collect();
    OrderWithAttempts::new(order, attempts)
  }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
  async fn upsert_order(&self, order: &NewOrder) -> StoreResult<()> {
    self.check_writable()?;
    let mut orders = self.orders.lock();
    match orders.iter_mut().find(|o| o.id == order.id) {
      Some(existing) => {
        existing.name = order.name.clone();
        existing.email = order.email.clone();
        existing.financial_status = order.financial_status.clone();
        existing.fulfillment_status = order.fulfillment_status.clone();
        existing.total_price = order.total_price.clone();
        existing.currency = order.currency.clone();
        existing.created_at = order.created_at;
        existing.updated_at = order.updated_at;
        existing.order_data = order.order_data.clone();
      }
      None => orders.push(Order {
        id: order.id.clone(),
        name: order.name.clone(),
        email: order.email.clone(),
        financial_status: order.financial_status.clone(),
        fulfillment_status: order.fulfillment_status.clone(),
        total_price: order.total_price.clone(),
        currency: order.currency.clone(),
        created_at: order.created_at,
        updated_at: order.updated_at,
        pod_order_id: None,
        pod_status: None,
        pod_sent_at: None,
        order_data: order.order_data.clone(),
      }),
    }
    Ok(())
  }

  async fn record_dispatch_outcome(&self, order_id: &str, outcome: &DispatchOutcome) -> StoreResult<()> {
    self.check_writable()?;
    {
      let mut orders = self.orders.lock();
      let order = orders
        .iter_mut()
        .find(|o| o.id == order_id)
        .ok_or_else(|| StoreError::InvalidRecord(format!("order {} does not exist", order_id)))?;
      order.pod_order_id = outcome.pod_order_id.clone();
      order.pod_status = Some(outcome.status.to_string());
      order.pod_sent_at = Some(Utc::now());
    }
    self.push_attempt(order_id, outcome.pod_order_id.clone(), outcome.status, &outcome.products, None);
    Ok(())
  }

  async fn record_dispatch_failure(
    &self,
    order_id: &str,
    products: &[PodProduct],
    error_message: &str,
  ) -> StoreResult<()> {
    self.check_writable()?;
    self.push_attempt(
      order_id,
      None,
      FulfillmentStatus::Failed,
      products,
      Some(error_message.to_string()),
    );
    Ok(())
  }

  async fn list_orders(&self, filter: OrderFilter, page: Pagination) -> StoreResult<OrderPage> {
    let mut matching: Vec<Order> = self
      .orders
      .lock()
      .iter()
      .filter(|o| filter.matches(o.pod_order_id.as_deref()))
      .cloned()
      .collect();
    matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
    let total = matching.len() as u64;
    let orders = matching
      .into_iter()
      .skip(page.offset() as usize)
      .take(page.limit as usize)
      .map(|o| self.with_attempts(o))
      .collect();
    Ok(OrderPage { orders, total })
  }

  async fn find_order(&self, order_id: &str) -> StoreResult<Option<OrderWithAttempts>> {
    Ok(self.order(order_id).map(|o| self.with_attempts(o)))
  }

  async fn ensure_schema(&self) -> StoreResult<()> {
    Ok(())
  }
}

// --- Scripted gateway ---

/// `PodGateway` answering from canned data and recording every created order.
pub struct ScriptedGateway {
  catalog: Mutex<Result<Vec<PodCatalogProduct>, (u16, String)>>,
  create_result: Mutex<Result<PodOrderResponse, (u16, String)>>,
  remote_orders: Mutex<Vec<PodOrderResponse>>,
  created: Mutex<Vec<Vec<PodProduct>>>,
}

impl ScriptedGateway {
  /// Catalog of `product_ids`; creating an order answers `{"id": "pod-1", "status": "processing"}`.
  pub fn with_catalog(product_ids: &[&str]) -> Self {
    let catalog = product_ids
      .iter()
      .map(|id| PodCatalogProduct {
        id: id.to_string(),
        name: Some(format!("Product {}", id)),
        description: None,
        price: Some(json!(9.99)),
        variants: Vec::new(),
      })
      .collect();
    Self {
      catalog: Mutex::new(Ok(catalog)),
      create_result: Mutex::new(Ok(receipt(Some("pod-1"), Some("processing")))),
      remote_orders: Mutex::new(Vec::new()),
      created: Mutex::new(Vec::new()),
    }
  }

  pub fn catalog_unavailable(self, status: u16) -> Self {
    *self.catalog.lock() = Err((status, "catalog down".to_string()));
    self
  }

  pub fn create_answers(self, response: PodOrderResponse) -> Self {
    *self.create_result.lock() = Ok(response);
    self
  }

  pub fn create_fails(self, status: u16, message: &str) -> Self {
    *self.create_result.lock() = Err((status, message.to_string()));
    self
  }

  pub fn with_remote_orders(self, orders: Vec<PodOrderResponse>) -> Self {
    *self.remote_orders.lock() = orders;
    self
  }

  pub fn created_orders(&self) -> Vec<Vec<PodProduct>> {
    self.created.lock().clone()
  }
}

pub fn receipt(id: Option<&str>, status: Option<&str>) -> PodOrderResponse {
  PodOrderResponse {
    id: id.map(String::from),
    status: status.map(String::from),
    ..Default::default()
  }
}

fn status_error((status, message): (u16, String)) -> GatewayError {
  GatewayError::Status { status, message }
}

#[async_trait]
impl PodGateway for ScriptedGateway {
  async fn list_products(&self) -> Result<Vec<PodCatalogProduct>, GatewayError> {
    self.catalog.lock().clone().map_err(status_error)
  }

  async fn create_order(&self, products: &[PodProduct]) -> Result<PodOrderResponse, GatewayError> {
    self.created.lock().push(products.to_vec());
    self.create_result.lock().clone().map_err(status_error)
  }

  async fn get_order(&self, id: &str) -> Result<Option<PodOrderResponse>, GatewayError> {
    Ok(
      self
        .remote_orders
        .lock()
        .iter()
        .find(|o| o.id.as_deref() == Some(id))
        .cloned(),
    )
  }

  async fn list_orders(&self) -> Result<Vec<PodOrderResponse>, GatewayError> {
    Ok(self.remote_orders.lock().clone())
  }
}

// --- Fake POD provider over HTTP ---

/// What the fake provider answers, endpoint by endpoint: `(status, body)`.
#[derive(Clone)]
pub struct FakePodBehavior {
  pub products: (u16, String),
  pub create_order: (u16, String),
  pub list_orders: (u16, String),
  pub get_order: (u16, String),
  /// Delay before every answer.
  pub delay: Option<Duration>,
}

impl Default for FakePodBehavior {
  fn default() -> Self {
    Self {
      products: (200, json!([{"id": "A", "name": "Mug"}, {"id": "B", "name": "Tee"}]).to_string()),
      create_order: (201, json!({"id": "pod-77", "status": "processing"}).to_string()),
      list_orders: (200, json!([{"id": "pod-77", "status": "processing"}]).to_string()),
      get_order: (200, json!({"id": "pod-77", "status": "processing", "tracking": "LT1"}).to_string()),
      delay: None,
    }
  }
}

#[derive(Debug, Clone)]
pub struct ReceivedRequest {
  pub method: String,
  pub path: String,
  pub authorization: Option<String>,
  pub body: String,
}

pub struct FakePodServer {
  pub base_url: String,
  received: Arc<Mutex<Vec<ReceivedRequest>>>,
}

impl FakePodServer {
  pub fn received(&self) -> Vec<ReceivedRequest> {
    self.received.lock().clone()
  }
}

#[derive(Clone)]
struct FakeState {
  behavior: FakePodBehavior,
  received: Arc<Mutex<Vec<ReceivedRequest>>>,
}

async fn fake_endpoint(req: HttpRequest, body: web::Bytes, state: web::Data<FakeState>) -> HttpResponse {
  state.received.lock().push(ReceivedRequest {
    method: req.method().to_string(),
    path: req.path().to_string(),
    authorization: req
      .headers()
      .get("authorization")
      .and_then(|v| v.to_str().ok())
      .map(String::from),
    body: String::from_utf8_lossy(&body).into_owned(),
  });
  if let Some(delay) = state.behavior.delay {
    tokio::time::sleep(delay).await;
  }

  let behavior = &state.behavior;
  let path = req.path().trim_start_matches("/api");
  let (status, body) = match (req.method().as_str(), path) {
    ("GET", "/products") => behavior.products.clone(),
    ("POST", "/orders") => behavior.create_order.clone(),
    ("GET", "/orders") => behavior.list_orders.clone(),
    ("GET", p) if p.starts_with("/orders/") => behavior.get_order.clone(),
    _ => (404, json!({"message": "no such route"}).to_string()),
  };
  let status = actix_web::http::StatusCode::from_u16(status).unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);
  HttpResponse::build(status).content_type("application/json").body(body)
}

/// Starts a provider double on an ephemeral port. Its base URL ends in `/api`.
pub async fn spawn_fake_pod_server(behavior: FakePodBehavior) -> FakePodServer {
  let received = Arc::new(Mutex::new(Vec::new()));
  let state = FakeState {
    behavior,
    received: received.clone(),
  };
  let server = HttpServer::new(move || {
    App::new()
      .app_data(web::Data::new(state.clone()))
      .default_service(web::to(fake_endpoint))
  })
  .workers(1)
  .bind(("127.0.0.1", 0))
  .expect("bind fake POD server");
  let addr = server.addrs()[0];
  actix_rt::spawn(server.run());

  FakePodServer {
    base_url: format!("http://{}/api", addr),
    received,
  }
}
