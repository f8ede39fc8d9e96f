//! Environment-driven configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use catalog_export_infra::pagination::PageSize;
use catalog_export_products::FieldPolicy;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEV_TOKEN: &str = "dev-export-token";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("{0} must be set")]
    Missing(&'static str),
}

#[derive(Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub api_token: String,
    pub page_size: PageSize,
    pub field_policy: FieldPolicy,
    /// JSON catalog used to seed the in-memory store.
    pub snapshot_path: Option<PathBuf>,
    pub use_persistent_stores: bool,
    pub database_url: Option<String>,
}

impl core::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("api_token", &"<redacted>")
            .field("page_size", &self.page_size)
            .field("field_policy", &self.field_policy)
            .field("snapshot_path", &self.snapshot_path)
            .field("use_persistent_stores", &self.use_persistent_stores)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = lookup("EXPORT_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "EXPORT_BIND_ADDR",
                message: e.to_string(),
            })?;

        let api_token = lookup("EXPORT_API_TOKEN").unwrap_or_else(|| {
            tracing::warn!("EXPORT_API_TOKEN not set; using insecure dev default");
            DEV_TOKEN.to_string()
        });

        let page_size = match lookup("EXPORT_PAGE_SIZE") {
            None => PageSize::default(),
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(PageSize::new)
                .ok_or_else(|| ConfigError::Invalid {
                    key: "EXPORT_PAGE_SIZE",
                    message: format!("expected 1..={}, got '{raw}'", PageSize::MAX),
                })?,
        };

        let field_policy = match lookup("EXPORT_FIELD_POLICY") {
            None => FieldPolicy::Deny,
            Some(raw) => raw.parse::<FieldPolicy>().map_err(|message| ConfigError::Invalid {
                key: "EXPORT_FIELD_POLICY",
                message,
            })?,
        };

        let use_persistent_stores = match lookup("USE_PERSISTENT_STORES") {
            None => false,
            Some(raw) => raw.trim().parse::<bool>().map_err(|e| ConfigError::Invalid {
                key: "USE_PERSISTENT_STORES",
                message: e.to_string(),
            })?,
        };

        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
        if use_persistent_stores && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        Ok(Self {
            bind_addr,
            api_token,
            page_size,
            field_policy,
            snapshot_path: lookup("EXPORT_SNAPSHOT_PATH").map(PathBuf::from),
            use_persistent_stores,
            database_url,
        })
    }
}
