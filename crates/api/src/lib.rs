//! HTTP API: export endpoints, token middleware and configuration.

pub mod app;
pub mod config;
pub mod middleware;
