//! Export error model.

use thiserror::Error;

/// Result type used across the export layer.
pub type ExportResult<T> = Result<T, ExportError>;

/// Error kinds surfaced by the export layer.
///
/// The HTTP boundary maps each kind to its own status code, so keep the
/// variants coarse: callers only need to know *which side* is at fault.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// Malformed or missing request parameters.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid export token.
    #[error("unauthorized")]
    Unauthorized,

    /// The persisted entity graph is inconsistent (dangling parent, option
    /// without a group, group without a translation, ...).
    #[error("data inconsistency: {0}")]
    DataInconsistency(String),

    /// A requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The storage collaborator failed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl ExportError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn inconsistent(msg: impl Into<String>) -> Self {
        Self::DataInconsistency(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        // Entity graphs are built by this crate family; a serialization failure
        // means the graph holds something JSON cannot represent.
        Self::DataInconsistency(format!("serialization failed: {value}"))
    }
}
