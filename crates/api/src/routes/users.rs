//! User profile endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::UserId;
use document_store::DocumentStore;
use domain::{Address, GeoPoint, UserProfile};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct AddressRequest {
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct FarmLocationRequest {
    pub farm_address: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Serialize)]
pub struct FarmAddressResponse {
    pub farmer_id: UserId,
    pub farm_address: String,
}

/// POST /users: register a profile.
#[tracing::instrument(skip(state, profile), fields(uid = %profile.uid))]
pub async fn create<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(profile): Json<UserProfile>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    let profile = state.users.create_profile(profile).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /users/:id
#[tracing::instrument(skip(state))]
pub async fn get<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(uid): Path<UserId>,
) -> Result<Json<UserProfile>, ApiError> {
    state
        .users
        .get_profile(&uid)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("User {uid} not found")))
}

/// PUT /users/:id/address: replace the primary delivery address.
#[tracing::instrument(skip(state, req))]
pub async fn update_address<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(uid): Path<UserId>,
    Json(req): Json<AddressRequest>,
) -> Result<StatusCode, ApiError> {
    state.users.update_primary_address(&uid, &req.address).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /users/:id/farm-location
#[tracing::instrument(skip(state, req))]
pub async fn update_farm_location<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(uid): Path<UserId>,
    Json(req): Json<FarmLocationRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .users
        .update_farm_location(&uid, &req.farm_address, GeoPoint::new(req.lat, req.lng))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/:id/addresses: saved delivery addresses.
#[tracing::instrument(skip(state))]
pub async fn addresses<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(uid): Path<UserId>,
) -> Result<Json<Vec<Address>>, ApiError> {
    Ok(Json(state.users.addresses(&uid).await?))
}

/// GET /farmers/:id/location: the seller's farm address, or a placeholder.
#[tracing::instrument(skip(state))]
pub async fn farm_address<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(farmer_id): Path<UserId>,
) -> Result<Json<FarmAddressResponse>, ApiError> {
    let farm_address = state.users.seller_farm_address(&farmer_id).await?;
    Ok(Json(FarmAddressResponse {
        farmer_id,
        farm_address,
    }))
}
