//! Cart endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{ProductId, UserId};
use document_store::DocumentStore;
use domain::{CartItem, CartService, Rupiah};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CartLineRequest {
    pub quantity: i64,
}

#[derive(Serialize)]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub total_price: Rupiah,
}

/// GET /users/:id/cart
#[tracing::instrument(skip(state))]
pub async fn get<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<UserId>,
) -> Result<Json<CartResponse>, ApiError> {
    let items = state.cart.cart_items(&user_id).await?;
    let total_price = CartService::<S>::total_price(&items);
    Ok(Json(CartResponse { items, total_price }))
}

/// PUT /users/:id/cart/:product_id: set the quantity of one line.
#[tracing::instrument(skip(state))]
pub async fn put_line<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((user_id, product_id)): Path<(UserId, ProductId)>,
    Json(req): Json<CartLineRequest>,
) -> Result<Json<CartItem>, ApiError> {
    let product = state
        .products
        .get_product(&product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product {product_id} not found")))?;

    let item = state
        .cart
        .add_to_cart(&user_id, &product, req.quantity)
        .await?;
    Ok(Json(item))
}

/// DELETE /users/:id/cart/:product_id
#[tracing::instrument(skip(state))]
pub async fn remove_line<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((user_id, product_id)): Path<(UserId, ProductId)>,
) -> Result<StatusCode, ApiError> {
    state.cart.remove_from_cart(&user_id, &product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
