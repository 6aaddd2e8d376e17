use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use serde::{Deserialize, Serialize};

use super::OrderStatus;
use crate::cart::CartItem;
use crate::money::Rupiah;

/// How the consumer pays. Only cash on delivery is offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "COD")]
    CashOnDelivery,
}

/// Who is asking for a status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    /// A farmer acting on an order that contains one of their products.
    Farmer(UserId),
    /// A consumer acting on their own order.
    Consumer(UserId),
}

impl Actor {
    pub fn user_id(&self) -> &UserId {
        match self {
            Actor::Farmer(id) | Actor::Consumer(id) => id,
        }
    }
}

/// An order placed at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub consumer_id: UserId,
    pub consumer_email: String,
    #[serde(default)]
    pub consumer_address: String,
    /// Snapshots of the purchased cart lines.
    pub items: Vec<CartItem>,
    pub total_price: Rupiah,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub status: OrderStatus,
    /// Creation time, stored as unix milliseconds so it sorts numerically.
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Returns true if any item was sold by the given farmer.
    pub fn involves_farmer(&self, farmer_id: &UserId) -> bool {
        self.items
            .iter()
            .any(|item| &item.product().farmer_id == farmer_id)
    }

    /// Checks whether `actor` may move this order to `to`.
    pub fn may_be_changed_by(&self, actor: &Actor, to: OrderStatus) -> bool {
        match actor {
            Actor::Farmer(farmer_id) => self.involves_farmer(farmer_id),
            Actor::Consumer(consumer_id) => {
                consumer_id == &self.consumer_id
                    && self.status == OrderStatus::Dikirim
                    && to == OrderStatus::Selesai
            }
        }
    }
}
