//! `catalog-export-core` — shared building blocks for the export layer.
//!
//! Identifiers and the error taxonomy used by every other crate. No IO here.

pub mod error;
pub mod id;

pub use error::{ExportError, ExportResult};
pub use id::{EntityId, LanguageId};
