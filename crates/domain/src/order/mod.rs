//! Orders and their status lifecycle.

mod model;
pub mod queries;
mod service;
mod status;

pub use model::{Actor, Order, PaymentMethod};
pub use service::OrderService;
pub use status::OrderStatus;

use common::{OrderId, UserId};
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The order is not in a status that allows the requested change.
    #[error("Invalid status transition: cannot move from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    /// The user may not make this change on this order.
    #[error("User {user_id} may not set order {order_id} to {to}")]
    NotPermitted {
        user_id: UserId,
        order_id: OrderId,
        to: OrderStatus,
    },
}
