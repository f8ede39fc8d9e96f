use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use catalog_export_auth::{TokenError, TokenVerifier};
use catalog_export_core::ExportError;

use crate::app::errors;

/// Header carrying the export token when no `Authorization` header is sent.
pub const EXPORT_TOKEN_HEADER: &str = "x-export-token";

#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<dyn TokenVerifier>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let verified = extract_token(req.headers()).and_then(|token| state.verifier.verify(token));

    if let Err(e) = verified {
        tracing::debug!(reason = %e, path = %req.uri().path(), "rejected export request");
        return errors::export_error_to_response(ExportError::Unauthorized);
    }

    next.run(req).await
}

fn extract_token(headers: &HeaderMap) -> Result<&str, TokenError> {
    if let Some(header) = headers.get(axum::http::header::AUTHORIZATION) {
        let header = header.to_str().map_err(|_| TokenError::Malformed)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(TokenError::Malformed)?
            .trim();
        if token.is_empty() {
            return Err(TokenError::Missing);
        }
        return Ok(token);
    }

    let header = headers.get(EXPORT_TOKEN_HEADER).ok_or(TokenError::Missing)?;
    let token = header.to_str().map_err(|_| TokenError::Malformed)?.trim();
    if token.is_empty() {
        return Err(TokenError::Missing);
    }
    Ok(token)
}
