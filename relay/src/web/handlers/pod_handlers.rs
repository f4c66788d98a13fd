// pod-relay/src/web/handlers/pod_handlers.rs

//! Read-only views of the POD provider's data. Gateway failures answer 502.

use actix_web::{web, HttpResponse};
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::state::AppState;

#[instrument(name = "handler::list_pod_products", skip(app_state))]
pub async fn list_pod_products_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let products = app_state.gateway.list_products().await?;
  info!("Fetched {} POD products.", products.len());
  Ok(HttpResponse::Ok().json(products))
}

#[instrument(name = "handler::list_pod_orders", skip(app_state))]
pub async fn list_pod_orders_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let orders = app_state.gateway.list_orders().await?;
  info!("Fetched {} POD orders.", orders.len());
  Ok(HttpResponse::Ok().json(orders))
}

#[instrument(name = "handler::get_pod_order", skip(app_state, path), fields(pod_order_id = %path.as_ref()))]
pub async fn get_pod_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let pod_order_id = path.into_inner();
  match app_state.gateway.get_order(&pod_order_id).await? {
    Some(order) => Ok(HttpResponse::Ok().json(order)),
    None => {
      warn!("POD order {} not found.", pod_order_id);
      Err(AppError::NotFound(format!("POD order {} not found", pod_order_id)))
    }
  }
}
