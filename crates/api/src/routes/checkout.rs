//! Checkout endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{ProductId, UserId};
use document_store::DocumentStore;
use domain::{Checkout, Order};
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub email: String,
    pub product_ids: Vec<ProductId>,
    /// Delivery address. Defaults to the profile's primary address.
    #[serde(default)]
    pub address: Option<String>,
}

/// POST /users/:id/checkout: place one order for the selected cart lines.
#[tracing::instrument(skip(state, req), fields(items = req.product_ids.len()))]
pub async fn place<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<UserId>,
    Json(req): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let items = state
        .cart
        .selected_items(&user_id, &req.product_ids)
        .await?;

    let address = match req.address.filter(|a| !a.trim().is_empty()) {
        Some(address) => address,
        None => state
            .users
            .get_profile(&user_id)
            .await?
            .map(|profile| profile.address)
            .unwrap_or_default(),
    };

    let order = state
        .checkout
        .checkout(Checkout {
            user_id,
            email: req.email,
            address,
            items,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}
