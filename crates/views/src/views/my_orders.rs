//! My orders read model: a consumer's orders, newest first.

use async_trait::async_trait;
use common::UserId;
use document_store::{Query, QuerySnapshot};
use domain::Order;
use domain::order::queries;
use tokio::sync::RwLock;

use crate::Result;
use crate::read_model::ReadModel;

/// Read model view of the orders a consumer has placed.
#[derive(Default)]
pub struct MyOrdersView {
    orders: RwLock<Vec<Order>>,
}

impl MyOrdersView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(consumer_id: &UserId) -> Query {
        queries::consumer_orders(consumer_id)
    }

    /// Gets all orders, newest first.
    pub async fn orders(&self) -> Vec<Order> {
        self.orders.read().await.clone()
    }

    /// Orders that are neither finished nor cancelled.
    pub async fn ongoing(&self) -> Vec<Order> {
        self.filtered(|o| o.status.is_ongoing()).await
    }

    /// Orders whose receipt has been confirmed.
    pub async fn finished(&self) -> Vec<Order> {
        self.filtered(|o| o.status.is_finished()).await
    }

    async fn filtered(&self, keep: impl Fn(&Order) -> bool) -> Vec<Order> {
        self.orders
            .read()
            .await
            .iter()
            .filter(|o| keep(o))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ReadModel for MyOrdersView {
    fn name(&self) -> &'static str {
        "MyOrdersView"
    }

    async fn apply(&self, snapshot: &QuerySnapshot) -> Result<()> {
        let orders: Vec<Order> = snapshot.to_objects()?;
        *self.orders.write().await = orders;
        Ok(())
    }

    async fn reset(&self) {
        self.orders.write().await.clear();
    }

    async fn count(&self) -> usize {
        self.orders.read().await.len()
    }
}
