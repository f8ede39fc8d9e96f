use axum::extract::{Query, rejection::QueryRejection};
use serde::Deserialize;

use catalog_export_core::{ExportError, ExportResult};

/// Query parameters of the export endpoints.
///
/// `from_id` is kept raw so a bad value becomes our own `bad_request`.
#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    pub from_id: Option<String>,
}

impl ExportParams {
    pub fn from_id(&self) -> ExportResult<u64> {
        let raw = self
            .from_id
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ExportError::bad_request("from_id is required"))?;

        raw.parse::<u64>().map_err(|_| {
            ExportError::bad_request(format!("from_id must be a non-negative integer, got '{raw}'"))
        })
    }
}

/// Cursor of an export request.
///
/// Extractor rejections (a repeated key, broken percent-encoding) are mapped
/// to `bad_request` so every error body stays JSON.
pub fn requested_cursor(query: Result<Query<ExportParams>, QueryRejection>) -> ExportResult<u64> {
    let Query(params) = query.map_err(|rejection| ExportError::bad_request(rejection.body_text()))?;
    params.from_id()
}
