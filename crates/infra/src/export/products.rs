use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};
use tracing::instrument;

use catalog_export_core::ExportResult;
use catalog_export_products::{FieldFilter, FieldPolicy, OptionMapper, Product, collect_product_options};

use crate::export::{ExportBatch, ParentResolver};
use crate::pagination::CursorPaginator;
use crate::store::ProductRepository;

pub const PRODUCT_ENTITY: &str = "product";

/// Exports products in cursor order.
///
/// Each record is the filtered product plus `type`, `parent_auto_increment`
/// and the deduplicated `options` of the product (or of its variants).
#[derive(Clone)]
pub struct ProductExporter {
    products: Arc<dyn ProductRepository>,
    parents: ParentResolver,
    paginator: CursorPaginator,
    filter: FieldFilter,
}

impl ProductExporter {
    pub fn new(products: Arc<dyn ProductRepository>, paginator: CursorPaginator) -> Self {
        Self {
            parents: ParentResolver::new(products.clone()),
            products,
            paginator,
            filter: FieldFilter::product(FieldPolicy::Deny),
        }
    }

    pub fn with_field_policy(mut self, policy: FieldPolicy) -> Self {
        self.filter = FieldFilter::product(policy);
        self
    }

    #[instrument(skip(self), err)]
    pub async fn export_from(&self, from_id: u64) -> ExportResult<ExportBatch> {
        let page = self
            .paginator
            .page(from_id, |from, limit| self.products.products_from(from, limit))
            .await?;

        let mut data = Vec::with_capacity(page.items.len());
        for product in &page.items {
            data.push(self.map_product(product).await?);
        }

        Ok(ExportBatch {
            entity_name: PRODUCT_ENTITY,
            data,
            last_id: page.last_id,
        })
    }

    pub async fn map_product(&self, product: &Product) -> ExportResult<Map<String, JsonValue>> {
        let mut record = self.filter.apply(&product.to_record()?);

        record.insert(
            "type".to_string(),
            JsonValue::String(product.product_type().as_str().to_string()),
        );

        let parent_cursor = self.parents.resolve_cursor(product.parent_id).await?;
        record.insert("parent_auto_increment".to_string(), JsonValue::from(parent_cursor));

        let options = collect_product_options(product, &OptionMapper::plain())?;
        record.insert("options".to_string(), serde_json::to_value(options)?);

        Ok(record)
    }
}
