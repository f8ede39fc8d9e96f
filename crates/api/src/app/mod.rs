//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage backend selection and exporter wiring
//! - `routes/`: HTTP routes + handlers (one file per exported entity)
//! - `dto.rs`: request parameters
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use catalog_export_auth::{StaticTokenVerifier, TokenVerifier};

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router from configuration (entrypoint used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> anyhow::Result<Router> {
    let services = services::build_services(config).await?;
    let verifier = Arc::new(StaticTokenVerifier::new(config.api_token.clone()));
    Ok(build_router(services, verifier))
}

/// Router over already-built services.
pub fn build_router(services: AppServices, verifier: Arc<dyn TokenVerifier>) -> Router {
    let auth_state = middleware::AuthState { verifier };

    // Export routes require a valid token.
    let protected = routes::router().layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn_with_state(
                auth_state,
                middleware::auth_middleware,
            ))
            .layer(Extension(Arc::new(services))),
    );

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .fallback(routes::system::not_found)
}
