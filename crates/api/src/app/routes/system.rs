use axum::http::{StatusCode, Uri};

use catalog_export_core::ExportError;

use crate::app::errors;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn not_found(uri: Uri) -> axum::response::Response {
    errors::export_error_to_response(ExportError::not_found(format!("no route for {}", uri.path())))
}
