//! Per-user shopping cart.

mod service;

pub use service::CartService;

use common::ProductId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::Rupiah;
use crate::product::Product;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product has no id yet, so it cannot key a cart line.
    #[error("Product has no id")]
    MissingProductId,

    /// Invalid quantity.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: i64 },

    /// A selected product is not in the cart.
    #[error("Product {product_id} is not in the cart")]
    NotInCart { product_id: ProductId },
}

/// A cart line: a snapshot of the product at the time it was added, with the
/// chosen quantity stored in place of the stock.
///
/// Stored exactly like a [`Product`], so order items keep the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartItem(Product);

impl CartItem {
    /// Snapshots a product with the given quantity.
    pub fn new(product: &Product, quantity: i64) -> Self {
        let mut snapshot = product.clone();
        snapshot.stock = quantity;
        Self(snapshot)
    }

    pub fn product_id(&self) -> &ProductId {
        &self.0.id
    }

    pub fn quantity(&self) -> i64 {
        self.0.stock
    }

    /// Returns the product snapshot.
    pub fn product(&self) -> &Product {
        &self.0
    }

    /// Returns price × quantity.
    pub fn subtotal(&self) -> Rupiah {
        self.0.price.multiply(self.0.stock)
    }
}

/// Sums price × quantity over the given lines.
pub fn total_price(items: &[CartItem]) -> Rupiah {
    items.iter().map(CartItem::subtotal).sum()
}

/// Like [`total_price`], but `None` if any product or the sum overflows.
pub fn checked_total_price(items: &[CartItem]) -> Option<Rupiah> {
    items.iter().try_fold(Rupiah::zero(), |total, item| {
        let subtotal = item.product().price.checked_multiply(item.quantity())?;
        total.checked_add(subtotal)
    })
}
