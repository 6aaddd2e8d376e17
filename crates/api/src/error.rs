//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use document_store::DocumentStoreError;
use domain::{CartError, CheckoutError, DomainError, OrderError, ProductError};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Domain logic error.
    Domain(DomainError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Domain(err) => domain_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    let status = status_for(&err);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, "domain operation failed");
    }
    (status, err.to_string())
}

fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
        DomainError::Product(product_err) => match product_err {
            ProductError::NotOwner { .. } => StatusCode::FORBIDDEN,
            ProductError::NameRequired
            | ProductError::InvalidPrice { .. }
            | ProductError::InvalidStock { .. } => StatusCode::BAD_REQUEST,
        },
        DomainError::Cart(cart_err) => match cart_err {
            CartError::NotInCart { .. } => StatusCode::NOT_FOUND,
            CartError::MissingProductId | CartError::InvalidQuantity { .. } => {
                StatusCode::BAD_REQUEST
            }
        },
        DomainError::Checkout(checkout_err) => match checkout_err {
            CheckoutError::NoItems
            | CheckoutError::InvalidQuantity { .. }
            | CheckoutError::TotalTooLarge => StatusCode::BAD_REQUEST,
            CheckoutError::InsufficientStock { .. } | CheckoutError::ProductUnavailable { .. } => {
                StatusCode::CONFLICT
            }
        },
        DomainError::Order(order_err) => match order_err {
            OrderError::NotPermitted { .. } => StatusCode::FORBIDDEN,
            OrderError::InvalidStatusTransition { .. } => StatusCode::CONFLICT,
        },
        DomainError::Store(DocumentStoreError::ConcurrencyConflict { .. }) => StatusCode::CONFLICT,
        DomainError::Store(DocumentStoreError::NotFound(_)) => StatusCode::NOT_FOUND,
        DomainError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}
