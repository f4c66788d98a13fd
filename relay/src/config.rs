// pod-relay/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;

pub const DEFAULT_POD_API_URL: &str = "https://savitarna.amspauda.lt/api";

#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub database_max_connections: u32,

  /// Shared secret for `X-Shopify-Hmac-Sha256`. When unset every webhook is rejected.
  pub webhook_secret: Option<String>,

  pub pod_api_url: String,
  pub pod_api_key: String,

  /// Run `CREATE TABLE IF NOT EXISTS` for the relay's tables at startup.
  pub init_schema: bool,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL")?;
    let database_max_connections = get_env("DATABASE_MAX_CONNECTIONS")
      .unwrap_or_else(|_| "5".to_string())
      .parse::<u32>()
      .map_err(|e| AppError::Config(format!("Invalid DATABASE_MAX_CONNECTIONS: {}", e)))?;

    let webhook_secret = get_env("SHOPIFY_WEBHOOK_SECRET").ok().filter(|s| !s.is_empty());
    if webhook_secret.is_none() {
      tracing::warn!("SHOPIFY_WEBHOOK_SECRET is not set; all incoming webhooks will be rejected.");
    }

    let pod_api_url = get_env("POD_API_URL").unwrap_or_else(|_| DEFAULT_POD_API_URL.to_string());
    let pod_api_key = get_env("POD_API_KEY")?;
    if pod_api_key.is_empty() {
      return Err(AppError::Config("POD_API_KEY must not be empty".to_string()));
    }

    let init_schema = get_env("INIT_SCHEMA")
      .unwrap_or_else(|_| "false".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid INIT_SCHEMA value: {}", e)))?;

    let config = Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      webhook_secret,
      pod_api_url,
      pod_api_key,
      init_schema,
    };
    tracing::info!(config = ?config, "Application configuration loaded.");
    Ok(config)
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

// Secrets stay out of logs.
impl std::fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("database_url", &"[REDACTED]")
      .field("database_max_connections", &self.database_max_connections)
      .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "[REDACTED]"))
      .field("pod_api_url", &self.pod_api_url)
      .field("pod_api_key", &"[REDACTED]")
      .field("init_schema", &self.init_schema)
      .finish()
  }
}
