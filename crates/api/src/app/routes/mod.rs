use axum::{Router, routing::get};

pub mod orders;
pub mod products;
pub mod system;

/// Router for all token-protected export endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/export/product", get(products::export_products))
        .route("/export/order", get(orders::export_orders))
}
