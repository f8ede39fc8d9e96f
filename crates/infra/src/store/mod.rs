//! Storage collaborator boundary.
//!
//! Read-only, cursor-ordered access to product and order snapshots. The
//! exporters only depend on the traits; backends live next to them.

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod snapshot;
pub mod r#trait;

pub use in_memory::InMemoryCatalogStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresCatalogStore;
pub use snapshot::CatalogSnapshot;
pub use r#trait::{OrderRepository, ProductRepository, StoreError};
