// pod-relay/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

use pod_relay::services::pod_client::PodClient;
use pod_relay::store::{OrderStore, PgOrderStore};
use pod_relay::web::configure_app_routes;
use pod_relay::{AppConfig, AppState};

#[actix_web::main]
async fn main() -> io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // RUST_LOG override
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting POD relay server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(io::Error::other(e.to_string()));
    }
  };

  let db_pool = match PgPoolOptions::new()
    .max_connections(app_config.database_max_connections)
    .connect(&app_config.database_url)
    .await
  {
    Ok(pool) => {
      tracing::info!("Successfully connected to the database.");
      pool
    }
    Err(e) => {
      tracing::error!(error = %e, "Failed to connect to the database.");
      return Err(io::Error::other(e.to_string()));
    }
  };

  let store = Arc::new(PgOrderStore::new(db_pool));
  if app_config.init_schema {
    if let Err(e) = store.ensure_schema().await {
      tracing::error!(error = %e, "Failed to initialize the database schema.");
      return Err(io::Error::other(e.to_string()));
    }
  }

  let gateway = match PodClient::new(&app_config.pod_api_url, &app_config.pod_api_key) {
    Ok(client) => Arc::new(client),
    Err(e) => {
      tracing::error!(error = %e, "Failed to build the POD API client.");
      return Err(io::Error::other(e.to_string()));
    }
  };

  let app_state = AppState::new(store, gateway, app_config.clone());
  tracing::info!(pipeline = app_state.intake_pipeline.name(), "Intake pipeline built.");

  let server_address = app_config.bind_address();
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
