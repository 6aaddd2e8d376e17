//! Queries over the `orders` collection, shared by services and live views.

use common::UserId;
use document_store::{Direction, Query};

use super::OrderStatus;
use crate::collections;

/// A consumer's orders, newest first.
pub fn consumer_orders(consumer_id: &UserId) -> Query {
    Query::collection(collections::ORDERS)
        .where_eq("consumer_id", consumer_id.as_str())
        .order_by("timestamp", Direction::Descending)
}

/// Every order, newest first. Farmer views filter this by item owner.
pub fn all_orders() -> Query {
    Query::collection(collections::ORDERS).order_by("timestamp", Direction::Descending)
}

/// Every order still waiting for a farmer.
pub fn pending_orders() -> Query {
    Query::collection(collections::ORDERS).where_eq("status", OrderStatus::Pending.as_str())
}
