//! Option / property mapping.
//!
//! Options and properties share one shape (a value inside a property group).
//! Both are normalised into [`MappedOption`] entries, which are then either
//! deduplicated (product export) or coalesced by label (order line items).

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use catalog_export_core::ExportResult;

use crate::product::{Product, PropertyGroupOption};

/// Separator used when coalescing several values under one label.
pub const MULTI_VALUE_SEPARATOR: &str = ", ";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MappedOption {
    pub label: String,
    pub value: String,

    /// `group_id` followed by the group's language id; disambiguates groups
    /// with identical names across locales.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_id: Option<String>,
}

impl MappedOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            attribute_id: None,
        }
    }

    pub fn with_attribute_id(mut self, attribute_id: impl Into<String>) -> Self {
        self.attribute_id = Some(attribute_id.into());
        self
    }
}

/// Maps option entities into [`MappedOption`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionMapper {
    attribute_ids: bool,
}

impl OptionMapper {
    /// `{label, value}` only.
    pub const fn plain() -> Self {
        Self { attribute_ids: false }
    }

    /// `{label, value, attribute_id}`; requires every group to carry a translation.
    pub const fn with_attribute_ids() -> Self {
        Self { attribute_ids: true }
    }

    pub fn map(&self, options: &[PropertyGroupOption]) -> ExportResult<Vec<MappedOption>> {
        options.iter().map(|o| self.map_one(o)).collect()
    }

    fn map_one(&self, option: &PropertyGroupOption) -> ExportResult<MappedOption> {
        let group = option.group()?;
        let mapped = MappedOption::new(group.name.clone(), option.name.clone());

        if !self.attribute_ids {
            return Ok(mapped);
        }

        let translation = group.first_translation()?;
        Ok(mapped.with_attribute_id(format!(
            "{}{}",
            option.group_id.to_hex(),
            translation.language_id.to_hex()
        )))
    }
}

/// Drop exact duplicates, keeping the first occurrence and the original order.
pub fn dedup_options(options: Vec<MappedOption>) -> Vec<MappedOption> {
    let mut seen = HashSet::with_capacity(options.len());
    options
        .into_iter()
        .filter(|o| seen.insert(o.clone()))
        .collect()
}

/// Options describing a product for export.
///
/// Simple products contribute their own options; configurable products the
/// concatenated options of every child variant. The result is deduplicated.
pub fn collect_product_options(
    product: &Product,
    mapper: &OptionMapper,
) -> ExportResult<Vec<MappedOption>> {
    let collected = if product.is_configurable() {
        let mut all = Vec::new();
        for child in &product.children {
            all.extend(mapper.map(&child.options)?);
        }
        all
    } else {
        mapper.map(&product.options)?
    };

    Ok(dedup_options(collected))
}

/// Coalesce options and properties by label.
///
/// The first entry for a label seeds it (including its attribute id); later
/// entries append their value. Repeated values are kept.
pub fn merge_by_label(
    options: Vec<MappedOption>,
    properties: Vec<MappedOption>,
) -> Vec<MappedOption> {
    let mut merged: Vec<MappedOption> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in options.into_iter().chain(properties) {
        match index.get(&item.label) {
            Some(&pos) => {
                let entry = &mut merged[pos];
                entry.value.push_str(MULTI_VALUE_SEPARATOR);
                entry.value.push_str(&item.value);
            }
            None => {
                index.insert(item.label.clone(), merged.len());
                merged.push(item);
            }
        }
    }

    merged
}
