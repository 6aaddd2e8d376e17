//! Marketplace domain for farmers ("Petani") and consumers ("Konsumen").
//!
//! Every service is generic over a [`document_store::DocumentStore`] and
//! keeps no state of its own:
//! - [`ProductService`] for listings and the consumer catalog
//! - [`CartService`] for per-user cart lines
//! - [`CheckoutService`] for the atomic order/stock/cart batch
//! - [`OrderService`] for order lookups and status changes
//! - [`NotificationService`] and [`UserService`] for the simple sub-records

pub mod cart;
pub mod checkout;
pub mod collections;
pub mod error;
pub mod money;
pub mod notification;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{CartError, CartItem, CartService, total_price};
pub use checkout::{Checkout, CheckoutError, CheckoutService};
pub use error::{DomainError, Result};
pub use money::Rupiah;
pub use notification::{Notification, NotificationKind, NotificationService, user_notifications};
pub use order::{Actor, Order, OrderError, OrderService, OrderStatus, PaymentMethod};
pub use product::{
    CatalogFilter, Category, GeoPoint, InventorySummary, Product, ProductError, ProductService,
    ProductUpdate, ShippingRange,
};
pub use user::{Address, Role, UserProfile, UserService};
