//! View error types.

use thiserror::Error;

/// Errors that can occur while applying a snapshot to a view.
#[derive(Debug, Error)]
pub enum ViewError {
    /// An error occurred in the document store.
    #[error("Document store error: {0}")]
    Store(#[from] document_store::DocumentStoreError),

    /// A view-specific error.
    #[error("View error: {0}")]
    View(String),
}

/// Result type for view operations.
pub type Result<T> = std::result::Result<T, ViewError>;
