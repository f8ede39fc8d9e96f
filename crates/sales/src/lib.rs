//! Orders and order line items (export projection).
//!
//! Pure mapping only; parent lookups are resolved by the caller and passed in.

pub mod line_items;
pub mod order;

pub use line_items::{ParentReference, product_snapshot, project_order, project_product_line_item};
pub use order::{Order, OrderLineItem, PRODUCT_LINE_ITEM};
