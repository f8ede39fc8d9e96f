use async_trait::async_trait;
use thiserror::Error;

use catalog_export_core::{EntityId, ExportError};
use catalog_export_products::Product;
use catalog_export_sales::Order;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend failed in {operation}: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },

    #[error("failed to decode {entity} document: {message}")]
    Decode {
        entity: &'static str,
        message: String,
    },

    #[error("failed to read snapshot: {0}")]
    Snapshot(String),

    #[error("store lock poisoned")]
    Poisoned,
}

impl From<StoreError> for ExportError {
    fn from(value: StoreError) -> Self {
        match value {
            // A row we cannot decode is bad data, not an unavailable backend.
            StoreError::Decode { .. } => ExportError::inconsistent(value.to_string()),
            other => ExportError::storage(other.to_string()),
        }
    }
}

/// Product reads used by the exporters.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Products with `auto_increment >= from_cursor`, ascending, at most `limit`.
    ///
    /// Options (with their groups and translations), properties, categories
    /// and children (with their options) must be loaded.
    async fn products_from(&self, from_cursor: u64, limit: usize) -> Result<Vec<Product>, StoreError>;

    /// Point lookup by identifier.
    async fn product_by_id(&self, id: EntityId) -> Result<Option<Product>, StoreError>;
}

/// Order reads used by the exporters.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Orders with `auto_increment >= from_cursor`, ascending, at most `limit`,
    /// with line items and their product snapshots loaded.
    async fn orders_from(&self, from_cursor: u64, limit: usize) -> Result<Vec<Order>, StoreError>;
}
