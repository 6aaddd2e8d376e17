//! Checkout: turns selected cart lines into an order.
//!
//! A checkout is one atomic write batch:
//!
//! 1. create the order document with a snapshot of the purchased lines
//! 2. decrement each product's stock by the purchased quantity
//! 3. delete each purchased line from the user's cart
//!
//! If any write fails, none applies. The stock decrement carries a floor of
//! zero, so concurrent checkouts cannot oversell a product.

use chrono::Utc;
use common::{OrderId, ProductId, UserId};
use document_store::{DocumentStore, DocumentStoreError, WriteBatch};
use thiserror::Error;

use crate::cart::{CartItem, checked_total_price};
use crate::collections;
use crate::error::{DomainError, Result};
use crate::notification::{NotificationKind, NotificationService};
use crate::order::{Order, OrderStatus, PaymentMethod};

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing was selected.
    #[error("No items selected for checkout")]
    NoItems,

    /// A selected line has a non-positive quantity.
    #[error("Invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: ProductId, quantity: i64 },

    /// A product has less stock than the quantity being bought.
    #[error("Insufficient stock for product {product_id}")]
    InsufficientStock { product_id: ProductId },

    /// A product was removed after it was put in the cart.
    #[error("Product {product_id} is no longer available")]
    ProductUnavailable { product_id: ProductId },

    /// Price × quantity does not fit in an amount.
    #[error("Order total is too large")]
    TotalTooLarge,
}

/// A checkout request.
#[derive(Debug, Clone)]
pub struct Checkout {
    pub user_id: UserId,
    pub email: String,
    pub address: String,
    /// The cart lines the consumer selected.
    pub items: Vec<CartItem>,
}

/// Service that places orders.
pub struct CheckoutService<S: DocumentStore + Clone> {
    store: S,
    notifications: NotificationService<S>,
}

impl<S: DocumentStore + Clone> CheckoutService<S> {
    /// Creates a new checkout service with the given document store.
    pub fn new(store: S) -> Self {
        Self {
            notifications: NotificationService::new(store.clone()),
            store,
        }
    }

    /// Places an order for the selected cart lines.
    ///
    /// On success the consumer also gets a "Pesanan Berhasil" notification.
    /// That write happens after the commit and its failure is only logged.
    #[tracing::instrument(skip(self, checkout), fields(user_id = %checkout.user_id, items = checkout.items.len()))]
    pub async fn checkout(&self, checkout: Checkout) -> Result<Order> {
        metrics::counter!("checkout_total").increment(1);

        let result = self.place_order(checkout).await;
        if let Err(e) = &result {
            metrics::counter!("checkout_failed_total").increment(1);
            tracing::warn!(error = %e, "checkout failed");
        }
        let order = result?;

        self.notifications
            .send_best_effort(
                &order.consumer_id,
                "Pesanan Berhasil",
                &format!("Pesanan #{} telah dibuat.", order.order_id),
                NotificationKind::Order,
            )
            .await;

        Ok(order)
    }

    async fn place_order(&self, checkout: Checkout) -> Result<Order> {
        validate(&checkout)?;
        let total_price =
            checked_total_price(&checkout.items).ok_or(CheckoutError::TotalTooLarge)?;

        let order = Order {
            order_id: OrderId::generate(),
            consumer_id: checkout.user_id,
            consumer_email: checkout.email,
            consumer_address: checkout.address,
            total_price,
            items: checkout.items,
            payment_method: PaymentMethod::CashOnDelivery,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };

        let mut batch = WriteBatch::new().set(collections::order(&order.order_id), &order)?;
        for item in &order.items {
            batch = batch
                .increment_with_floor(
                    collections::product(item.product_id()),
                    "stock",
                    -item.quantity(),
                    0,
                )
                .delete(collections::cart_line(&order.consumer_id, item.product_id()));
        }

        let start = std::time::Instant::now();
        self.store.commit(batch).await.map_err(commit_error)?;
        metrics::histogram!("checkout_commit_duration_seconds")
            .record(start.elapsed().as_secs_f64());

        tracing::info!(
            order_id = %order.order_id,
            total = %order.total_price,
            "order placed"
        );
        Ok(order)
    }
}

fn validate(checkout: &Checkout) -> std::result::Result<(), DomainError> {
    if checkout.user_id.is_empty() {
        return Err(DomainError::required("user_id"));
    }
    if checkout.items.is_empty() {
        return Err(CheckoutError::NoItems.into());
    }
    for item in &checkout.items {
        if item.product_id().is_empty() {
            return Err(DomainError::required("product id"));
        }
        if item.quantity() <= 0 {
            return Err(CheckoutError::InvalidQuantity {
                product_id: item.product_id().clone(),
                quantity: item.quantity(),
            }
            .into());
        }
    }
    Ok(())
}

/// Translates store failures on product documents into checkout errors.
fn commit_error(err: DocumentStoreError) -> DomainError {
    match err {
        DocumentStoreError::FloorViolation { path, .. } => CheckoutError::InsufficientStock {
            product_id: ProductId::new(path.id),
        }
        .into(),
        DocumentStoreError::NotFound(path) if path.collection.as_str() == collections::PRODUCTS => {
            CheckoutError::ProductUnavailable {
                product_id: ProductId::new(path.id),
            }
            .into()
        }
        other => DomainError::Store(other),
    }
}
