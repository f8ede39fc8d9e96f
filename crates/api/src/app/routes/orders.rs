use std::sync::Arc;

use axum::{
    extract::{Extension, Query, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub async fn export_orders(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::ExportParams>, QueryRejection>,
) -> axum::response::Response {
    let from_id = match dto::requested_cursor(query) {
        Ok(v) => v,
        Err(e) => return errors::export_error_to_response(e),
    };

    match services.orders.export_from(from_id).await {
        Ok(batch) => (StatusCode::OK, Json(batch)).into_response(),
        Err(e) => errors::export_error_to_response(e),
    }
}
