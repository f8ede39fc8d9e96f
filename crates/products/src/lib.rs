//! Product catalog projection.
//!
//! This crate holds the product entity graph as the storage layer hands it
//! out and the pure transforms that reshape it for export (no IO, no HTTP,
//! no storage).

pub mod fields;
pub mod options;
pub mod product;

pub use fields::{FieldFilter, FieldPolicy, ORDER_DENYLIST, PRODUCT_ALLOWLIST, PRODUCT_DENYLIST};
pub use options::{MappedOption, OptionMapper, collect_product_options, dedup_options, merge_by_label};
pub use product::{Category, GroupTranslation, Product, ProductType, PropertyGroup, PropertyGroupOption};
