//! Incoming orders read model: a farmer's order dashboard.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use common::UserId;
use document_store::{Query, QuerySnapshot};
use domain::order::queries;
use domain::{Order, OrderStatus};
use tokio::sync::RwLock;

use crate::Result;
use crate::read_model::ReadModel;

/// Read model view of orders that contain one of a farmer's products.
///
/// Also raises a "new order" flag whenever a snapshot holds a pending order
/// for this farmer. The flag stays down after [`reset_new_order_flag`]
/// until the next snapshot arrives.
///
/// [`reset_new_order_flag`]: IncomingOrdersView::reset_new_order_flag
pub struct IncomingOrdersView {
    farmer_id: UserId,
    orders: RwLock<Vec<Order>>,
    has_new_orders: AtomicBool,
}

impl IncomingOrdersView {
    pub fn new(farmer_id: UserId) -> Self {
        Self {
            farmer_id,
            orders: RwLock::new(Vec::new()),
            has_new_orders: AtomicBool::new(false),
        }
    }

    /// The query this view listens to. Filtering by farmer happens on apply.
    pub fn query() -> Query {
        queries::all_orders()
    }

    pub fn farmer_id(&self) -> &UserId {
        &self.farmer_id
    }

    /// Gets the farmer's orders, newest first.
    pub async fn orders(&self) -> Vec<Order> {
        self.orders.read().await.clone()
    }

    pub fn has_new_orders(&self) -> bool {
        self.has_new_orders.load(Ordering::Acquire)
    }

    /// Lowers the new-order flag once the farmer has seen the dashboard.
    pub fn reset_new_order_flag(&self) {
        self.has_new_orders.store(false, Ordering::Release);
    }
}

#[async_trait]
impl ReadModel for IncomingOrdersView {
    fn name(&self) -> &'static str {
        "IncomingOrdersView"
    }

    async fn apply(&self, snapshot: &QuerySnapshot) -> Result<()> {
        let all: Vec<Order> = snapshot.to_objects()?;
        let mine: Vec<Order> = all
            .into_iter()
            .filter(|o| o.involves_farmer(&self.farmer_id))
            .collect();

        let pending = mine.iter().any(|o| o.status == OrderStatus::Pending);
        self.has_new_orders.store(pending, Ordering::Release);
        *self.orders.write().await = mine;
        Ok(())
    }

    async fn reset(&self) {
        self.orders.write().await.clear();
        self.reset_new_order_flag();
    }

    async fn count(&self) -> usize {
        self.orders.read().await.len()
    }
}
