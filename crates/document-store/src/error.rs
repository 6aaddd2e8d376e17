use thiserror::Error;

use crate::{DocumentPath, Version};

/// Errors that can occur when interacting with the document store.
#[derive(Debug, Error)]
pub enum DocumentStoreError {
    /// The document does not exist.
    #[error("Document not found: {0}")]
    NotFound(DocumentPath),

    /// A version precondition did not match the stored document.
    #[error("Concurrency conflict for document {path}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        path: DocumentPath,
        expected: Version,
        actual: Version,
    },

    /// An `Exists` precondition failed.
    #[error("Precondition failed for document {path}: {reason}")]
    PreconditionFailed { path: DocumentPath, reason: String },

    /// An increment would take a field below its floor.
    #[error(
        "Increment on {path}.{field} rejected: {current} + {delta} is below the floor of {floor}"
    )]
    FloorViolation {
        path: DocumentPath,
        field: String,
        current: i64,
        delta: i64,
        floor: i64,
    },

    /// A field name or field value is not usable for the requested operation.
    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    /// Document data must serialize to a JSON object.
    #[error("Invalid document data: {0}")]
    InvalidDocument(String),

    /// A write batch with no operations was committed.
    #[error("Cannot commit an empty write batch")]
    EmptyBatch,

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for document store operations.
pub type Result<T> = std::result::Result<T, DocumentStoreError>;
