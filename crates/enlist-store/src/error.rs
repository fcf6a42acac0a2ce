//! Error types for enlist storage.

use enlist_core::{IdError, QueryError};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Document not found.
    #[error("document not found: {document}")]
    NotFound {
        /// The `collection/id` that was not found.
        document: String,
    },

    /// The store cannot be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Collection name or document id rejected.
    #[error("invalid reference: {0}")]
    InvalidReference(#[from] IdError),

    /// Query filter rejected.
    #[error("invalid query: {0}")]
    InvalidQuery(#[from] QueryError),
}

impl StoreError {
    /// Whether this error means the addressed document does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
