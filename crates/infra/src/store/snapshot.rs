use std::path::Path;

use serde::{Deserialize, Serialize};

use catalog_export_products::Product;
use catalog_export_sales::Order;

use super::r#trait::StoreError;

/// A JSON dump of the catalog used to seed the in-memory store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

impl CatalogSnapshot {
    pub fn from_json_str(raw: &str) -> Result<Self, StoreError> {
        serde_json::from_str(raw).map_err(|e| StoreError::Snapshot(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Snapshot(format!("{}: {e}", path.display())))?;
        let snapshot = Self::from_json_str(&raw)?;
        tracing::info!(
            path = %path.display(),
            products = snapshot.products.len(),
            orders = snapshot.orders.len(),
            "loaded catalog snapshot"
        );
        Ok(snapshot)
    }
}
