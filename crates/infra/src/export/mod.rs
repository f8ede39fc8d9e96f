//! Exporters: page an entity kind from storage and project each entity.

pub mod orders;
pub mod products;

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use catalog_export_core::{EntityId, ExportError, ExportResult};
use catalog_export_products::Product;
use catalog_export_sales::ParentReference;

use crate::store::ProductRepository;

pub use orders::OrderExporter;
pub use products::ProductExporter;

/// One exported page, as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportBatch {
    pub entity_name: &'static str,
    pub data: Vec<Map<String, JsonValue>>,
    pub last_id: Option<u64>,
}

/// Resolves a variant's parent product.
///
/// A parent id that does not resolve means the snapshot is inconsistent; it
/// is reported, never defaulted.
#[derive(Clone)]
pub struct ParentResolver {
    products: Arc<dyn ProductRepository>,
}

impl ParentResolver {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    /// Parent cursor, `0` for products without a parent.
    pub async fn resolve_cursor(&self, parent_id: Option<EntityId>) -> ExportResult<u64> {
        match parent_id {
            None => Ok(0),
            Some(id) => Ok(self.load_parent(id).await?.auto_increment),
        }
    }

    /// Parent cursor and number, both null for products without a parent.
    pub async fn resolve_reference(&self, parent_id: Option<EntityId>) -> ExportResult<ParentReference> {
        match parent_id {
            None => Ok(ParentReference::default()),
            Some(id) => Ok(ParentReference::of(&self.load_parent(id).await?)),
        }
    }

    async fn load_parent(&self, id: EntityId) -> ExportResult<Product> {
        match self.products.product_by_id(id).await? {
            Some(parent) => Ok(parent),
            None => {
                tracing::warn!(parent_id = %id, "parent product is missing");
                Err(ExportError::inconsistent(format!("parent product {id} not found")))
            }
        }
    }
}
