// pod-relay/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{order_handlers, pod_handlers, setup_handlers, webhook_handlers};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Mounts every relay route under `/api`.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api")
      .route("/health", web::get().to(health_check_handler))
      // Storefront webhooks
      .service(
        web::scope("/webhooks").route(
          "/orders/paid",
          web::post().to(webhook_handlers::orders_paid_webhook_handler),
        ),
      )
      // Dashboard query API
      .service(
        web::scope("/orders")
          .route("", web::get().to(order_handlers::list_orders_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler)),
      )
      // Read-only passthrough to the POD provider
      .service(
        web::scope("/pod")
          .route("/products", web::get().to(pod_handlers::list_pod_products_handler))
          .route("/orders", web::get().to(pod_handlers::list_pod_orders_handler))
          .route("/orders/{pod_order_id}", web::get().to(pod_handlers::get_pod_order_handler)),
      )
      .service(
        web::resource("/setup")
          .route(web::get().to(setup_handlers::describe_setup_handler))
          .route(web::post().to(setup_handlers::run_setup_handler)),
      ),
  );
}
