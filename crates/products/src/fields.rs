//! Field-level projection of flattened entity records.

use serde_json::{Map, Value as JsonValue};

/// Internal product fields that never leave the export layer: associations,
/// foreign keys, versioning fields and verbose nested objects.
pub const PRODUCT_DENYLIST: &[&str] = &[
    "children",
    "parentId",
    "parent",
    "optionIds",
    "media",
    "properties",
    "propertyIds",
    "categories",
    "categoryTree",
    "taxId",
    "manufacturerId",
    "unitId",
    "displayGroup",
    "manufacturerNumber",
    "ean",
    "deliveryTimeId",
    "deliveryTime",
    "restockTime",
    "isCloseout",
    "purchaseSteps",
    "maxPurchase",
    "minPurchase",
    "purchaseUnit",
    "referenceUnit",
    "shippingFree",
    "purchasePrice",
    "markAsTopseller",
    "weight",
    "width",
    "height",
    "length",
    "releaseDate",
    "keywords",
    "description",
    "metaDescription",
    "metaTitle",
    "packUnit",
    "configuratorGroupConfig",
    "tax",
    "manufacturer",
    "unit",
    "prices",
    "listingPrices",
    "cover",
    "searchKeywords",
    "translations",
    "tags",
    "configuratorSettings",
    "categoriesRo",
    "coverId",
    "blacklistIds",
    "whitelistIds",
    "customFields",
    "tagIds",
    "productReviews",
    "ratingAverage",
    "mainCategories",
    "seoUrls",
    "orderLineItems",
    "crossSellings",
    "crossSellingAssignedProducts",
    "_uniqueIdentifier",
    "versionId",
    "translated",
    "extensions",
    "parentVersionId",
    "productManufacturerVersionId",
    "productMediaVersionId",
];

/// Product fields a client is known to consume.
pub const PRODUCT_ALLOWLIST: &[&str] = &[
    "id",
    "autoIncrement",
    "active",
    "productNumber",
    "stock",
    "availableStock",
    "available",
    "name",
    "variantRestrictions",
    "options",
    "visibilities",
    "createdAt",
    "updatedAt",
    "price",
    "childCount",
];

/// Internal order fields. `lineItems` is replaced by the mapped line items.
pub const ORDER_DENYLIST: &[&str] = &[
    "lineItems",
    "addresses",
    "deliveries",
    "transactions",
    "documents",
    "tags",
    "tagIds",
    "customFields",
    "extensions",
    "translated",
    "_uniqueIdentifier",
    "versionId",
    "billingAddressVersionId",
    "currencyId",
    "languageId",
    "salesChannelId",
    "deepLinkCode",
];

/// How a filter decides which keys pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPolicy {
    /// Everything except the denylist.
    Deny,
    /// Only the allowlist (minus the denylist).
    Allow,
}

impl core::str::FromStr for FieldPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deny" => Ok(Self::Deny),
            "allow" => Ok(Self::Allow),
            other => Err(format!("unknown field policy '{other}' (expected deny|allow)")),
        }
    }
}

/// Projects a flattened record onto the fields an entity may expose.
#[derive(Debug, Clone, Copy)]
pub struct FieldFilter {
    entity_name: &'static str,
    policy: FieldPolicy,
    denylist: &'static [&'static str],
    allowlist: &'static [&'static str],
}

impl FieldFilter {
    pub const fn deny(entity_name: &'static str, denylist: &'static [&'static str]) -> Self {
        Self {
            entity_name,
            policy: FieldPolicy::Deny,
            denylist,
            allowlist: &[],
        }
    }

    pub const fn allow(
        entity_name: &'static str,
        allowlist: &'static [&'static str],
        denylist: &'static [&'static str],
    ) -> Self {
        Self {
            entity_name,
            policy: FieldPolicy::Allow,
            denylist,
            allowlist,
        }
    }

    /// The product filter for a given policy.
    pub const fn product(policy: FieldPolicy) -> Self {
        match policy {
            FieldPolicy::Deny => Self::deny("product", PRODUCT_DENYLIST),
            FieldPolicy::Allow => Self::allow("product", PRODUCT_ALLOWLIST, PRODUCT_DENYLIST),
        }
    }

    pub const fn order() -> Self {
        Self::deny("order", ORDER_DENYLIST)
    }

    pub fn entity_name(&self) -> &'static str {
        self.entity_name
    }

    pub fn policy(&self) -> FieldPolicy {
        self.policy
    }

    pub fn passes(&self, key: &str) -> bool {
        if self.denylist.contains(&key) {
            return false;
        }
        match self.policy {
            FieldPolicy::Deny => true,
            FieldPolicy::Allow => self.allowlist.contains(&key),
        }
    }

    /// Copy every passing field into a new record headed by `entity_name`.
    pub fn apply(&self, record: &Map<String, JsonValue>) -> Map<String, JsonValue> {
        let mut out = Map::with_capacity(record.len() + 1);
        out.insert(
            "entity_name".to_string(),
            JsonValue::String(self.entity_name.to_string()),
        );
        for (key, value) in record {
            if self.passes(key) {
                out.insert(key.clone(), value.clone());
            }
        }
        out
    }
}
