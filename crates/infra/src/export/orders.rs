use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};
use tracing::instrument;

use catalog_export_core::ExportResult;
use catalog_export_products::FieldFilter;
use catalog_export_sales::{Order, product_snapshot, project_order, project_product_line_item};

use crate::export::{ExportBatch, ParentResolver};
use crate::pagination::CursorPaginator;
use crate::store::{OrderRepository, ProductRepository};

pub const ORDER_ENTITY: &str = "order";

/// Exports orders in cursor order with their product line items projected.
#[derive(Clone)]
pub struct OrderExporter {
    orders: Arc<dyn OrderRepository>,
    parents: ParentResolver,
    paginator: CursorPaginator,
    filter: FieldFilter,
}

impl OrderExporter {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        products: Arc<dyn ProductRepository>,
        paginator: CursorPaginator,
    ) -> Self {
        Self {
            orders,
            parents: ParentResolver::new(products),
            paginator,
            filter: FieldFilter::order(),
        }
    }

    #[instrument(skip(self), err)]
    pub async fn export_from(&self, from_id: u64) -> ExportResult<ExportBatch> {
        let page = self
            .paginator
            .page(from_id, |from, limit| self.orders.orders_from(from, limit))
            .await?;

        let mut data = Vec::with_capacity(page.items.len());
        for order in &page.items {
            data.push(self.map_order(order).await?);
        }

        Ok(ExportBatch {
            entity_name: ORDER_ENTITY,
            data,
            last_id: page.last_id,
        })
    }

    pub async fn map_order(&self, order: &Order) -> ExportResult<Map<String, JsonValue>> {
        project_order(order, &self.filter, self.map_line_items(order).await?)
    }

    /// Product line items only; other positions (promotions, credits, ...) are skipped.
    pub async fn map_line_items(&self, order: &Order) -> ExportResult<Vec<Map<String, JsonValue>>> {
        let mut mapped = Vec::new();
        for item in &order.line_items {
            let Some(product) = product_snapshot(item)? else {
                continue;
            };
            let parent = self.parents.resolve_reference(product.parent_id).await?;
            mapped.push(project_product_line_item(item, product, &parent)?);
        }
        tracing::debug!(
            order = %order.id,
            positions = order.line_items.len(),
            exported = mapped.len(),
            "mapped order line items"
        );
        Ok(mapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::PageSize;
    use crate::store::InMemoryCatalogStore;
    use catalog_export_core::{EntityId, ExportError, LanguageId};
    use catalog_export_products::{GroupTranslation, Product, PropertyGroup, PropertyGroupOption};
    use catalog_export_sales::OrderLineItem;
    use serde_json::json;

    fn option(group: &PropertyGroup, value: &str) -> PropertyGroupOption {
        PropertyGroupOption {
            id: EntityId::new(),
            group_id: group.id,
            name: value.to_string(),
            group: Some(group.clone()),
        }
    }

    fn seeded() -> (Arc<InMemoryCatalogStore>, Order) {
        let language = LanguageId::new();
        let color = PropertyGroup {
            id: EntityId::new(),
            name: "Color".to_string(),
            translations: vec![GroupTranslation {
                language_id: language,
                name: Some("Color".to_string()),
            }],
        };

        let parent = Product::new(EntityId::new(), 42, "SW-42");
        let mut variant = Product::new(EntityId::new(), 43, "SW-42.1");
        variant.parent_id = Some(parent.id);
        variant.options = vec![option(&color, "Red")];
        variant.properties = vec![option(&color, "Blue"), option(&color, "Red")];

        let mut line = OrderLineItem::new(EntityId::new(), "product", "Shirt Red");
        line.product_id = Some(variant.id);
        line.product = Some(variant.clone());

        let promo = OrderLineItem::new(EntityId::new(), "promotion", "Summer sale");

        let mut order = Order::new(EntityId::new(), 5, "10005");
        order.line_items = vec![line, promo];
        order.fields.insert("versionId".to_string(), json!("v"));

        let store = Arc::new(InMemoryCatalogStore::new());
        store.upsert_product(parent).unwrap();
        store.upsert_product(variant).unwrap();
        store.upsert_order(order.clone()).unwrap();
        (store, order)
    }

    #[tokio::test]
    async fn exports_product_positions_with_parent_and_merged_options() {
        let (store, _) = seeded();
        let exporter = OrderExporter::new(
            store.clone(),
            store,
            CursorPaginator::new(PageSize::new(10).unwrap()),
        );

        let batch = exporter.export_from(1).await.unwrap();
        assert_eq!(batch.entity_name, "order");
        assert_eq!(batch.last_id, Some(5));

        let order = &batch.data[0];
        assert_eq!(order["entity_name"], json!("order"));
        assert!(!order.contains_key("versionId"));

        let items = order["lineItems"].as_array().unwrap();
        assert_eq!(items.len(), 1, "promotion positions are skipped");
        let product = &items[0]["product"];
        assert_eq!(product["parent"], json!({"autoIncrement": 42, "productNumber": "SW-42"}));
        assert_eq!(product["options"][0]["value"], json!("Red, Blue, Red"));
    }

    #[tokio::test]
    async fn product_position_without_snapshot_fails() {
        let store = Arc::new(InMemoryCatalogStore::new());
        let mut order = Order::new(EntityId::new(), 1, "10001");
        order.line_items = vec![OrderLineItem::new(EntityId::new(), "product", "Deleted")];
        store.upsert_order(order).unwrap();

        let exporter = OrderExporter::new(store.clone(), store, CursorPaginator::default());
        let err = exporter.export_from(0).await.unwrap_err();
        assert!(matches!(err, ExportError::DataInconsistency(_)));
    }

    #[tokio::test]
    async fn no_orders_yields_empty_batch() {
        let store = Arc::new(InMemoryCatalogStore::new());
        let exporter = OrderExporter::new(store.clone(), store, CursorPaginator::default());
        let batch = exporter.export_from(0).await.unwrap();
        assert!(batch.data.is_empty());
        assert_eq!(batch.last_id, None);
    }
}
