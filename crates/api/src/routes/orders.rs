//! Order history, farmer dashboard, and status endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::{OrderId, UserId};
use document_store::DocumentStore;
use domain::{Actor, Order, OrderStatus, Role};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

/// Who is changing the order, and to what.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub user_id: UserId,
    pub role: Role,
    pub status: OrderStatus,
}

impl StatusRequest {
    fn actor(&self) -> Actor {
        match self.role {
            Role::Petani => Actor::Farmer(self.user_id.clone()),
            Role::Konsumen => Actor::Consumer(self.user_id.clone()),
        }
    }
}

#[derive(Serialize)]
pub struct IncomingOrdersResponse {
    pub orders: Vec<Order>,
    pub has_new_orders: bool,
}

/// GET /users/:id/orders: a consumer's orders, newest first.
#[tracing::instrument(skip(state))]
pub async fn mine<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(consumer_id): Path<UserId>,
) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(state.orders.orders_for_consumer(&consumer_id).await?))
}

/// GET /farmers/:id/orders: orders containing one of the farmer's products.
#[tracing::instrument(skip(state))]
pub async fn incoming<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(farmer_id): Path<UserId>,
) -> Result<Json<IncomingOrdersResponse>, ApiError> {
    let orders = state.orders.incoming_orders_for_farmer(&farmer_id).await?;
    let has_new_orders = orders.iter().any(|o| o.status == OrderStatus::Pending);
    Ok(Json(IncomingOrdersResponse {
        orders,
        has_new_orders,
    }))
}

/// POST /orders/:id/status
#[tracing::instrument(skip(state, req), fields(user_id = %req.user_id, to = %req.status))]
pub async fn update_status<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(order_id): Path<OrderId>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<Order>, ApiError> {
    let order = state
        .orders
        .update_status(&order_id, &req.actor(), req.status)
        .await?;
    Ok(Json(order))
}
