use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue, json};

use catalog_export_core::{ExportError, ExportResult};
use catalog_export_products::{FieldFilter, OptionMapper, Product, merge_by_label};

use crate::order::{Order, OrderLineItem};

/// Cursor and number of a variant's parent product, as embedded in line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentReference {
    pub auto_increment: Option<u64>,
    pub product_number: Option<String>,
}

impl ParentReference {
    pub fn of(parent: &Product) -> Self {
        Self {
            auto_increment: Some(parent.auto_increment),
            product_number: Some(parent.product_number.clone()),
        }
    }
}

/// The product snapshot of a line item, `None` for non-product positions.
///
/// A product position without its snapshot is an inconsistent order.
pub fn product_snapshot(item: &OrderLineItem) -> ExportResult<Option<&Product>> {
    if !item.is_product() {
        return Ok(None);
    }
    item.product.as_ref().map(Some).ok_or_else(|| {
        ExportError::inconsistent(format!(
            "product line item {} has no product snapshot",
            item.id
        ))
    })
}

/// Replace a line item's embedded product with its compact export form.
///
/// Options and properties are mapped with attribute ids and coalesced by label.
pub fn project_product_line_item(
    item: &OrderLineItem,
    product: &Product,
    parent: &ParentReference,
) -> ExportResult<Map<String, JsonValue>> {
    let mapper = OptionMapper::with_attribute_ids();
    let options = mapper.map(&product.options)?;
    let properties = mapper.map(&product.properties)?;
    let merged = merge_by_label(options, properties);

    let mut record = item.to_record()?;
    record.insert(
        "product".to_string(),
        json!({
            "autoIncrement": product.auto_increment,
            "productNumber": product.product_number,
            "childCount": product.child_count,
            "categories": product.first_category_breadcrumb(),
            "parent": parent,
            "options": merged,
        }),
    );
    Ok(record)
}

/// Filter an order record and attach its already-projected line items.
pub fn project_order(
    order: &Order,
    filter: &FieldFilter,
    line_items: Vec<Map<String, JsonValue>>,
) -> ExportResult<Map<String, JsonValue>> {
    let mut record = filter.apply(&order.to_record()?);
    record.insert(
        "lineItems".to_string(),
        JsonValue::Array(line_items.into_iter().map(JsonValue::Object).collect()),
    );
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_export_core::{EntityId, LanguageId};
    use catalog_export_products::{Category, GroupTranslation, PropertyGroup, PropertyGroupOption};

    fn group(name: &str, language_id: LanguageId) -> PropertyGroup {
        PropertyGroup {
            id: EntityId::new(),
            name: name.to_string(),
            translations: vec![GroupTranslation {
                language_id,
                name: None,
            }],
        }
    }

    fn option(group: &PropertyGroup, value: &str) -> PropertyGroupOption {
        PropertyGroupOption {
            id: EntityId::new(),
            group_id: group.id,
            name: value.to_string(),
            group: Some(group.clone()),
        }
    }

    fn product_item(product: Product) -> OrderLineItem {
        let mut item = OrderLineItem::new(EntityId::new(), "product", product.product_number.clone());
        item.quantity = 2;
        item.unit_price = 10.0;
        item.total_price = 20.0;
        item.product_id = Some(product.id);
        item.product = Some(product);
        item
    }

    #[test]
    fn non_product_items_have_no_snapshot() {
        let item = OrderLineItem::new(EntityId::new(), "promotion", "10% off");
        assert!(product_snapshot(&item).unwrap().is_none());
    }

    #[test]
    fn product_item_without_snapshot_is_inconsistent() {
        let item = OrderLineItem::new(EntityId::new(), "product", "Ghost");
        assert!(matches!(
            product_snapshot(&item),
            Err(ExportError::DataInconsistency(_))
        ));
    }

    #[test]
    fn projects_compact_product_with_merged_options() {
        let language = LanguageId::new();
        let color = group("Color", language);

        let mut product = Product::new(EntityId::new(), 12, "SW-12.1");
        product.parent_id = Some(EntityId::new());
        product.options = vec![option(&color, "Red")];
        product.properties = vec![option(&color, "Blue")];
        product.categories = vec![Category {
            id: EntityId::new(),
            name: None,
            breadcrumb: vec!["Home".to_string(), "Shirts".to_string()],
        }];

        let item = product_item(product.clone());
        let parent = ParentReference {
            auto_increment: Some(11),
            product_number: Some("SW-12".to_string()),
        };

        let record = project_product_line_item(&item, &product, &parent).unwrap();

        assert_eq!(record["quantity"], json!(2));
        assert_eq!(record["type"], json!("product"));
        let mapped = &record["product"];
        assert_eq!(mapped["autoIncrement"], json!(12));
        assert_eq!(mapped["productNumber"], json!("SW-12.1"));
        assert_eq!(mapped["childCount"], json!(0));
        assert_eq!(mapped["categories"], json!(["Home", "Shirts"]));
        assert_eq!(mapped["parent"], json!({"autoIncrement": 11, "productNumber": "SW-12"}));
        assert_eq!(mapped["options"][0]["label"], json!("Color"));
        assert_eq!(mapped["options"][0]["value"], json!("Red, Blue"));
        assert_eq!(
            mapped["options"][0]["attribute_id"],
            json!(format!("{}{}", color.id.to_hex(), language.to_hex()))
        );
        // The full snapshot is gone.
        assert_eq!(mapped["options"].as_array().unwrap().len(), 1);
        assert!(mapped.get("children").is_none());
    }

    #[test]
    fn missing_parent_serializes_as_nulls() {
        let product = Product::new(EntityId::new(), 3, "SW-3");
        let item = product_item(product.clone());

        let record = project_product_line_item(&item, &product, &ParentReference::default()).unwrap();
        assert_eq!(
            record["product"]["parent"],
            json!({"autoIncrement": null, "productNumber": null})
        );
        assert_eq!(record["product"]["categories"], json!([]));
    }

    #[test]
    fn order_record_drops_internal_fields_and_embeds_line_items() {
        let mut order = Order::new(EntityId::new(), 4, "10004");
        order.amount_total = 59.9;
        order.fields.insert("versionId".to_string(), json!("v1"));
        order.fields.insert("customFields".to_string(), json!({"x": 1}));
        order.line_items = vec![OrderLineItem::new(EntityId::new(), "promotion", "Promo")];

        let projected = vec![Map::from_iter([("id".to_string(), json!("li"))])];
        let record = project_order(&order, &FieldFilter::order(), projected).unwrap();

        assert_eq!(record["entity_name"], json!("order"));
        assert_eq!(record["orderNumber"], json!("10004"));
        assert!(!record.contains_key("versionId"));
        assert!(!record.contains_key("customFields"));
        assert_eq!(record["lineItems"], json!([{"id": "li"}]));
    }
}
