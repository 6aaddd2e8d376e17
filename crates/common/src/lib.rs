//! Shared identifier types for the TaniMart marketplace.

mod ids;

pub use ids::{AddressId, NotificationId, OrderId, ProductId, UserId};
