use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use catalog_export_core::ExportError;

pub fn export_error_to_response(err: ExportError) -> axum::response::Response {
    match err {
        ExportError::BadRequest(msg) => json_error(StatusCode::BAD_REQUEST, "bad_request", msg),
        ExportError::Unauthorized => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", "missing or invalid export token")
        }
        ExportError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        ExportError::DataInconsistency(msg) => {
            tracing::error!(error = %msg, "export aborted on inconsistent data");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "data_inconsistency", msg)
        }
        ExportError::Storage(msg) => {
            tracing::error!(error = %msg, "storage collaborator failed");
            json_error(StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable", msg)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "status": "error",
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
