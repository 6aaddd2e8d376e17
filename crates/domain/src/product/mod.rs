//! Product listings and the consumer catalog.

mod catalog;
mod model;
mod service;

pub use catalog::{ALL_CATEGORIES, CatalogFilter};
pub use model::{Category, GeoPoint, Product, ProductUpdate, ShippingRange};
pub use service::{InventorySummary, ProductService};

use common::{ProductId, UserId};
use thiserror::Error;

use crate::money::Rupiah;

/// Errors that can occur during product operations.
#[derive(Debug, Error)]
pub enum ProductError {
    /// Product name is required.
    #[error("Product name is required")]
    NameRequired,

    /// Invalid price.
    #[error("Invalid price: {price} (must not be negative)")]
    InvalidPrice { price: Rupiah },

    /// Invalid stock.
    #[error("Invalid stock: {stock} (must not be negative)")]
    InvalidStock { stock: i64 },

    /// Only the owning farmer may change a product.
    #[error("Product {product_id} is not owned by {farmer_id}")]
    NotOwner {
        product_id: ProductId,
        farmer_id: UserId,
    },
}
