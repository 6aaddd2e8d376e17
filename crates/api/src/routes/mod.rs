//! HTTP route handlers.

pub mod cart;
pub mod checkout;
pub mod health;
pub mod metrics;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod users;
