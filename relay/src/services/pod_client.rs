// pod-relay/src/services/pod_client.rs

//! REST client for the print-on-demand provider.
//!
//! Every call carries `Authorization: Apikey <key>` and is bounded by a fixed
//! 30 second timeout. There are no retries: a timeout or non-2xx answer is returned
//! to the caller straight away as a [`GatewayError`].

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value as JsonValue;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::models::pod::CreatePodOrderRequest;
use crate::models::{PodCatalogProduct, PodOrderResponse, PodProduct};

pub const POD_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum GatewayError {
  /// The provider answered with a non-2xx status.
  #[error("POD API Error: {status} - {message}")]
  Status { status: u16, message: String },

  /// Connection failure, timeout, or an unreadable response body.
  #[error("POD API request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("POD client misconfigured: {0}")]
  Config(String),
}

impl GatewayError {
  /// HTTP status reported by the provider, when there was a response at all.
  pub fn status(&self) -> Option<u16> {
    match self {
      GatewayError::Status { status, .. } => Some(*status),
      GatewayError::Transport(e) => e.status().map(|s| s.as_u16()),
      GatewayError::Config(_) => None,
    }
  }
}

/// The operations the relay needs from the POD provider.
#[async_trait]
pub trait PodGateway: Send + Sync {
  /// `GET /products`. Any unexpected body shape yields an empty list.
  async fn list_products(&self) -> Result<Vec<PodCatalogProduct>, GatewayError>;

  /// `POST /orders` with `{"products": [...]}`.
  async fn create_order(&self, products: &[PodProduct]) -> Result<PodOrderResponse, GatewayError>;

  /// `GET /orders/{id}`. A 404 means the order does not exist and yields `None`.
  async fn get_order(&self, id: &str) -> Result<Option<PodOrderResponse>, GatewayError>;

  /// `GET /orders`. Any unexpected body shape yields an empty list.
  async fn list_orders(&self) -> Result<Vec<PodOrderResponse>, GatewayError>;
}

/// reqwest-backed [`PodGateway`].
#[derive(Clone)]
pub struct PodClient {
  http: Client,
  base_url: String,
}

impl PodClient {
  pub fn new(base_url: &str, api_key: &str) -> Result<Self, GatewayError> {
    Self::with_timeout(base_url, api_key, POD_REQUEST_TIMEOUT)
  }

  pub fn with_timeout(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, GatewayError> {
    if api_key.is_empty() {
      return Err(GatewayError::Config("POD API key is required".to_string()));
    }
    let mut headers = HeaderMap::new();
    let mut auth = HeaderValue::from_str(&format!("Apikey {}", api_key))
      .map_err(|e| GatewayError::Config(format!("invalid API key header: {}", e)))?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let http = Client::builder().default_headers(headers).timeout(timeout).build()?;
    Ok(Self {
      http,
      base_url: base_url.trim_end_matches('/').to_string(),
    })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url, path)
  }

  /// Turns a non-2xx response into `GatewayError::Status`, preferring the provider's
  /// own `message` field.
  async fn ensure_success(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<JsonValue>(&body)
      .ok()
      .and_then(|v| v.get("message").and_then(JsonValue::as_str).map(str::to_string))
      .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));
    error!(status = status.as_u16(), %message, "POD API returned an error status.");
    Err(GatewayError::Status {
      status: status.as_u16(),
      message,
    })
  }

  /// Decodes a JSON array body element by element, dropping elements of the wrong shape.
  async fn json_array<T: serde::de::DeserializeOwned>(response: Response) -> Result<Vec<T>, GatewayError> {
    let body: JsonValue = match response.json().await {
      Ok(v) => v,
      Err(e) if e.is_decode() => {
        warn!(error = %e, "POD API returned a non-JSON body where a list was expected.");
        return Ok(Vec::new());
      }
      Err(e) => return Err(e.into()),
    };
    let JsonValue::Array(items) = body else {
      warn!("POD API returned a non-array body where a list was expected.");
      return Ok(Vec::new());
    };
    let total = items.len();
    let parsed: Vec<T> = items
      .into_iter()
      .filter_map(|item| serde_json::from_value(item).ok())
      .collect();
    if parsed.len() != total {
      warn!(dropped = total - parsed.len(), "Dropped malformed entries from POD API list.");
    }
    Ok(parsed)
  }
}

#[async_trait]
impl PodGateway for PodClient {
  #[instrument(name = "pod_client::list_products", skip(self), err(Display))]
  async fn list_products(&self) -> Result<Vec<PodCatalogProduct>, GatewayError> {
    let response = self.http.get(self.url("/products")).send().await?;
    let products = Self::json_array(Self::ensure_success(response).await?).await?;
    debug!(count = products.len(), "Fetched POD catalog.");
    Ok(products)
  }

  #[instrument(name = "pod_client::create_order", skip(self, products), fields(lines = products.len()), err(Display))]
  async fn create_order(&self, products: &[PodProduct]) -> Result<PodOrderResponse, GatewayError> {
    let response = self
      .http
      .post(self.url("/orders"))
      .json(&CreatePodOrderRequest { products })
      .send()
      .await?;
    let response = Self::ensure_success(response).await?;
    // Some deployments answer 201 with an empty body.
    let body = response.bytes().await?;
    let created = if body.is_empty() {
      PodOrderResponse::default()
    } else {
      serde_json::from_slice(&body).unwrap_or_else(|e| {
        warn!(error = %e, "POD order created but response body was not understood.");
        PodOrderResponse::default()
      })
    };
    info!(pod_order_id = ?created.id, pod_status = ?created.status, "POD order created.");
    Ok(created)
  }

  #[instrument(name = "pod_client::get_order", skip(self), err(Display))]
  async fn get_order(&self, id: &str) -> Result<Option<PodOrderResponse>, GatewayError> {
    let response = self.http.get(self.url(&format!("/orders/{}", id))).send().await?;
    if response.status() == StatusCode::NOT_FOUND {
      debug!("POD order not found.");
      return Ok(None);
    }
    let order = Self::ensure_success(response).await?.json::<PodOrderResponse>().await?;
    Ok(Some(order))
  }

  #[instrument(name = "pod_client::list_orders", skip(self), err(Display))]
  async fn list_orders(&self) -> Result<Vec<PodOrderResponse>, GatewayError> {
    let response = self.http.get(self.url("/orders")).send().await?;
    Self::json_array(Self::ensure_success(response).await?).await
  }
}
