//! Domain error types.

use document_store::DocumentStoreError;
use thiserror::Error;

use crate::cart::CartError;
use crate::checkout::CheckoutError;
use crate::order::OrderError;
use crate::product::ProductError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the document store.
    #[error("Document store error: {0}")]
    Store(#[from] DocumentStoreError),

    #[error("Product error: {0}")]
    Product(#[from] ProductError),

    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// A referenced record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// A required field was empty or malformed.
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
}

impl DomainError {
    pub(crate) fn not_found(kind: &'static str, id: impl std::fmt::Display) -> Self {
        DomainError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub(crate) fn required(field: &'static str) -> Self {
        DomainError::Validation {
            field,
            reason: "must not be empty".to_string(),
        }
    }

    /// Maps a store `NotFound` (update of a missing document) to a domain
    /// `NotFound` for the given record kind.
    pub(crate) fn from_store(kind: &'static str, err: DocumentStoreError) -> Self {
        match err {
            DocumentStoreError::NotFound(path) => DomainError::not_found(kind, path.id),
            other => DomainError::Store(other),
        }
    }
}

/// Result type alias for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;
