use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};

use catalog_export_core::{EntityId, ExportError, ExportResult, LanguageId};

/// Synthetic product type derived from the number of child variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Simple,
    Configurable,
}

impl ProductType {
    pub fn classify(child_count: u32) -> Self {
        if child_count > 0 {
            Self::Configurable
        } else {
            Self::Simple
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Configurable => "configurable",
        }
    }
}

impl core::fmt::Display for ProductType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A product (or variant) snapshot as loaded from the catalog.
///
/// Associations the exporter needs are typed; every other catalog field
/// (price, name, stock, media, tax, ...) is carried in `fields` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: EntityId,

    /// Monotonic export cursor.
    pub auto_increment: u64,

    #[serde(default)]
    pub parent_id: Option<EntityId>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub child_count: u32,

    #[serde(default, deserialize_with = "null_as_default")]
    pub product_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Variant-defining options (each belongs to a property group).
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<PropertyGroupOption>,

    /// Descriptive properties (same shape as options).
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: Vec<PropertyGroupOption>,

    /// Child variants, eager-loaded with their own options.
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<Product>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<Category>,

    #[serde(flatten)]
    pub fields: Map<String, JsonValue>,
}

impl Product {
    /// Minimal product with no associations, used as a builder seed.
    pub fn new(id: EntityId, auto_increment: u64, product_number: impl Into<String>) -> Self {
        Self {
            id,
            auto_increment,
            parent_id: None,
            child_count: 0,
            product_number: product_number.into(),
            created_at: None,
            updated_at: None,
            options: Vec::new(),
            properties: Vec::new(),
            children: Vec::new(),
            categories: Vec::new(),
            fields: Map::new(),
        }
    }

    pub fn product_type(&self) -> ProductType {
        ProductType::classify(self.child_count)
    }

    pub fn is_configurable(&self) -> bool {
        self.product_type() == ProductType::Configurable
    }

    /// Breadcrumb of the first assigned category, empty when uncategorised.
    pub fn first_category_breadcrumb(&self) -> &[String] {
        self.categories
            .first()
            .map(|c| c.breadcrumb.as_slice())
            .unwrap_or(&[])
    }

    /// Embedded child variants as standalone products.
    ///
    /// Children loaded through the parent may omit `parentId`; it is filled
    /// in from the embedding product.
    pub fn variants(&self) -> impl Iterator<Item = Product> + '_ {
        self.children.iter().map(|child| {
            let mut variant = child.clone();
            variant.parent_id.get_or_insert(self.id);
            variant
        })
    }

    /// Flatten the snapshot into a field-name → value record.
    pub fn to_record(&self) -> ExportResult<Map<String, JsonValue>> {
        match serde_json::to_value(self)? {
            JsonValue::Object(map) => Ok(map),
            other => Err(ExportError::inconsistent(format!(
                "product {} serialized to a non-object: {other}",
                self.id
            ))),
        }
    }
}

/// Catalog documents carry `null` for unset scalars and empty associations
/// (variants have `childCount: null`); read those as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: EntityId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub breadcrumb: Vec<String>,
}

/// A single option value ("Red") belonging to a property group ("Color").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyGroupOption {
    pub id: EntityId,
    pub group_id: EntityId,
    pub name: String,

    /// Eager-loaded owning group. Absent when the association was not loaded
    /// or the group row is gone.
    #[serde(default)]
    pub group: Option<PropertyGroup>,
}

impl PropertyGroupOption {
    pub fn group(&self) -> ExportResult<&PropertyGroup> {
        self.group.as_ref().ok_or_else(|| {
            ExportError::inconsistent(format!(
                "option {} references group {} which was not loaded",
                self.id, self.group_id
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyGroup {
    pub id: EntityId,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub translations: Vec<GroupTranslation>,
}

impl PropertyGroup {
    pub fn first_translation(&self) -> ExportResult<&GroupTranslation> {
        self.translations.first().ok_or_else(|| {
            ExportError::inconsistent(format!("property group {} has no translations", self.id))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupTranslation {
    pub language_id: LanguageId,
    #[serde(default)]
    pub name: Option<String>,
}
