use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use catalog_export_core::{EntityId, ExportError, ExportResult};
use catalog_export_products::Product;

/// Line item type discriminator for product positions.
pub const PRODUCT_LINE_ITEM: &str = "product";

/// An order snapshot with its line items eager-loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: EntityId,

    /// Monotonic export cursor.
    pub auto_increment: u64,

    #[serde(default)]
    pub order_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_date_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub amount_total: f64,

    #[serde(default)]
    pub line_items: Vec<OrderLineItem>,

    #[serde(flatten)]
    pub fields: Map<String, JsonValue>,
}

impl Order {
    pub fn new(id: EntityId, auto_increment: u64, order_number: impl Into<String>) -> Self {
        Self {
            id,
            auto_increment,
            order_number: order_number.into(),
            order_date_time: None,
            amount_total: 0.0,
            line_items: Vec::new(),
            fields: Map::new(),
        }
    }

    pub fn to_record(&self) -> ExportResult<Map<String, JsonValue>> {
        into_record(serde_json::to_value(self)?, "order", self.id)
    }
}

/// A single order position. Only `type == "product"` items carry a product snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub id: EntityId,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub quantity: u32,

    #[serde(default)]
    pub unit_price: f64,

    #[serde(default)]
    pub total_price: f64,

    #[serde(default)]
    pub product_id: Option<EntityId>,

    #[serde(default)]
    pub product: Option<Product>,

    #[serde(flatten)]
    pub fields: Map<String, JsonValue>,
}

impl OrderLineItem {
    pub fn new(id: EntityId, kind: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
            label: label.into(),
            quantity: 1,
            unit_price: 0.0,
            total_price: 0.0,
            product_id: None,
            product: None,
            fields: Map::new(),
        }
    }

    pub fn is_product(&self) -> bool {
        self.kind == PRODUCT_LINE_ITEM
    }

    pub fn to_record(&self) -> ExportResult<Map<String, JsonValue>> {
        into_record(serde_json::to_value(self)?, "order line item", self.id)
    }
}

fn into_record(value: JsonValue, what: &str, id: EntityId) -> ExportResult<Map<String, JsonValue>> {
    match value {
        JsonValue::Object(map) => Ok(map),
        other => Err(ExportError::inconsistent(format!(
            "{what} {id} serialized to a non-object: {other}"
        ))),
    }
}
