//! Order service: lookups and status changes.

use common::{OrderId, UserId};
use document_store::{DocumentStore, DocumentStoreExt, Fields, WriteBatch};
use serde_json::Value;

use super::{Actor, Order, OrderError, OrderStatus, queries};
use crate::collections;
use crate::error::{DomainError, Result};
use crate::notification::{NotificationKind, NotificationService};

/// Service for reading orders and moving them through their lifecycle.
pub struct OrderService<S: DocumentStore + Clone> {
    store: S,
    notifications: NotificationService<S>,
}

impl<S: DocumentStore + Clone> OrderService<S> {
    /// Creates a new order service with the given document store.
    pub fn new(store: S) -> Self {
        Self {
            notifications: NotificationService::new(store.clone()),
            store,
        }
    }

    /// Loads an order by id.
    ///
    /// Returns None if the order doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: &OrderId) -> Result<Option<Order>> {
        Ok(self.store.get_as(&collections::order(order_id)).await?)
    }

    /// Lists a consumer's orders, newest first.
    pub async fn orders_for_consumer(&self, consumer_id: &UserId) -> Result<Vec<Order>> {
        Ok(self
            .store
            .query_as(&queries::consumer_orders(consumer_id))
            .await?)
    }

    /// Lists orders containing at least one of the farmer's products,
    /// newest first.
    pub async fn incoming_orders_for_farmer(&self, farmer_id: &UserId) -> Result<Vec<Order>> {
        let orders: Vec<Order> = self.store.query_as(&queries::all_orders()).await?;
        Ok(orders
            .into_iter()
            .filter(|o| o.involves_farmer(farmer_id))
            .collect())
    }

    /// Returns true if a pending order contains one of the farmer's products.
    pub async fn has_pending_orders_for_farmer(&self, farmer_id: &UserId) -> Result<bool> {
        let pending: Vec<Order> = self.store.query_as(&queries::pending_orders()).await?;
        Ok(pending.iter().any(|o| o.involves_farmer(farmer_id)))
    }

    /// Moves an order to a new status on behalf of `actor`.
    ///
    /// The write is conditional on the version that was read: two
    /// concurrent changes cannot both succeed. The consumer is notified
    /// afterwards on a best-effort basis.
    #[tracing::instrument(skip(self), fields(user_id = %actor.user_id()))]
    pub async fn update_status(
        &self,
        order_id: &OrderId,
        actor: &Actor,
        status: OrderStatus,
    ) -> Result<Order> {
        let path = collections::order(order_id);
        let doc = self
            .store
            .get(&path)
            .await?
            .ok_or_else(|| DomainError::not_found("order", order_id))?;
        let mut order: Order = doc.deserialize()?;

        if !order.may_be_changed_by(actor, status) {
            return Err(OrderError::NotPermitted {
                user_id: actor.user_id().clone(),
                order_id: order_id.clone(),
                to: status,
            }
            .into());
        }
        if !order.status.can_transition_to(status) {
            return Err(OrderError::InvalidStatusTransition {
                from: order.status,
                to: status,
            }
            .into());
        }

        let mut fields = Fields::new();
        fields.insert("status".to_string(), Value::String(status.as_str().to_string()));
        self.store
            .commit(WriteBatch::new().update_at_version(path, fields, doc.version))
            .await
            .map_err(|e| DomainError::from_store("order", e))?;

        let from = order.status;
        order.status = status;
        metrics::counter!("order_status_updates", "status" => status.as_str()).increment(1);
        tracing::info!(order_id = %order_id, %from, to = %status, "order status updated");

        self.notifications
            .send_best_effort(
                &order.consumer_id,
                "Update Pesanan",
                &format!("Status pesanan {}: {}", order_id, status),
                NotificationKind::Order,
            )
            .await;

        Ok(order)
    }
}
