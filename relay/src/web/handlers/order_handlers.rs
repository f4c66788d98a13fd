// pod-relay/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::state::AppState;
use crate::store::{OrderFilter, Pagination, DEFAULT_PAGE_SIZE};

/// Raw query values; parsed by hand so bad numbers get the API's own 400 body.
#[derive(Deserialize, Debug, Default)]
pub struct ListOrdersQuery {
  pub page: Option<String>,
  pub limit: Option<String>,
  pub status: Option<String>,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct PaginationMeta {
  pub page: u32,
  pub limit: u32,
  pub total: u64,
  pub pages: u64,
}

fn parse_positive(name: &str, raw: Option<&str>, default: u32) -> Result<u32, AppError> {
  let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
    return Ok(default);
  };
  match raw.parse::<u32>() {
    Ok(value) if value > 0 => Ok(value),
    _ => Err(AppError::Validation(format!("'{}' must be a positive integer", name))),
  }
}

impl ListOrdersQuery {
  pub fn pagination(&self) -> Result<Pagination, AppError> {
    let page = parse_positive("page", self.page.as_deref(), 1)?;
    let limit = parse_positive("limit", self.limit.as_deref(), DEFAULT_PAGE_SIZE)?;
    Pagination::new(page, limit).ok_or_else(|| AppError::Validation("invalid pagination".to_string()))
  }

  pub fn filter(&self) -> OrderFilter {
    OrderFilter::from_query(self.status.as_deref())
  }
}

/// `GET /api/orders?page=&limit=&status=pod|no-pod`
#[instrument(name = "handler::list_orders", skip(app_state))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<ListOrdersQuery>,
) -> Result<HttpResponse, AppError> {
  let page = query_params.pagination()?;
  let filter = query_params.filter();

  let result = app_state.store.list_orders(filter, page).await?;
  info!(
    returned = result.orders.len(),
    total = result.total,
    "Orders listed."
  );

  let pagination = PaginationMeta {
    page: page.page,
    limit: page.limit,
    total: result.total,
    pages: page.pages(result.total),
  };
  Ok(HttpResponse::Ok().json(json!({
    "orders": result.orders,
    "pagination": pagination,
  })))
}

/// `GET /api/orders/{order_id}`
#[instrument(name = "handler::get_order", skip(app_state, path), fields(order_id = %path.as_ref()))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();

  match app_state.store.find_order(&order_id).await? {
    Some(order) => Ok(HttpResponse::Ok().json(order)),
    None => {
      warn!("Order {} not found.", order_id);
      Err(AppError::NotFound(format!("Order {} not found", order_id)))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn query(page: Option<&str>, limit: Option<&str>) -> ListOrdersQuery {
    ListOrdersQuery {
      page: page.map(String::from),
      limit: limit.map(String::from),
      status: None,
    }
  }

  #[test]
  fn defaults_to_first_page_of_twenty() {
    assert_eq!(query(None, None).pagination().unwrap(), Pagination::new(1, 20).unwrap());
  }

  #[test]
  fn rejects_zero_negative_and_garbage() {
    for bad in ["0", "-1", "two", "1.5"] {
      assert!(matches!(query(Some(bad), None).pagination(), Err(AppError::Validation(_))));
      assert!(matches!(query(None, Some(bad)).pagination(), Err(AppError::Validation(_))));
    }
  }

  #[test]
  fn caps_large_limits() {
    assert_eq!(query(Some("3"), Some("100000")).pagination().unwrap().limit, 250);
  }
}
