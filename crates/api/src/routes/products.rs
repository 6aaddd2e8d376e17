//! Product listing and catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{ProductId, UserId};
use document_store::DocumentStore;
use domain::{CatalogFilter, GeoPoint, InventorySummary, Product, ProductUpdate};
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiError;

/// Catalog query string: `?category=Buah&q=mangga&lat=-7.8&lng=110.4`.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogParams {
    pub category: Option<String>,
    pub q: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl CatalogParams {
    fn into_filter(self) -> Result<CatalogFilter, ApiError> {
        let mut filter = CatalogFilter::new();
        if let Some(category) = self.category {
            filter = filter.category(category);
        }
        if let Some(q) = self.q {
            filter = filter.search(q);
        }
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => filter = filter.near(GeoPoint::new(lat, lng)),
            (None, None) => {}
            _ => {
                return Err(ApiError::BadRequest(
                    "lat and lng must be given together".to_string(),
                ));
            }
        }
        Ok(filter)
    }
}

#[derive(Debug, Deserialize)]
pub struct EditProductRequest {
    pub farmer_id: UserId,
    #[serde(flatten)]
    pub update: ProductUpdate,
}

#[derive(Debug, Deserialize)]
pub struct OwnerParams {
    pub farmer_id: UserId,
}

/// POST /products: list a new product. The id is assigned by the store.
#[tracing::instrument(skip(state, product), fields(farmer_id = %product.farmer_id))]
pub async fn create<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(product): Json<Product>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = state.products.add_product(product).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /products: the catalog, filtered and optionally sorted by distance.
#[tracing::instrument(skip(state))]
pub async fn catalog<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<CatalogParams>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let filter = params.into_filter()?;
    Ok(Json(state.products.catalog(&filter).await?))
}

/// PUT /products/:id: edit a listing. Only its farmer may do so.
#[tracing::instrument(skip(state, req), fields(farmer_id = %req.farmer_id))]
pub async fn edit<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<ProductId>,
    Json(req): Json<EditProductRequest>,
) -> Result<Json<Product>, ApiError> {
    let product = state
        .products
        .edit_product(&req.farmer_id, &id, req.update)
        .await?;
    Ok(Json(product))
}

/// DELETE /products/:id?farmer_id=...
#[tracing::instrument(skip(state))]
pub async fn remove<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<ProductId>,
    Query(owner): Query<OwnerParams>,
) -> Result<StatusCode, ApiError> {
    state.products.delete_product(&owner.farmer_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /farmers/:id/products
#[tracing::instrument(skip(state))]
pub async fn by_farmer<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(farmer_id): Path<UserId>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.products.products_by_farmer(&farmer_id).await?))
}

/// GET /farmers/:id/summary: product count and total stock.
#[tracing::instrument(skip(state))]
pub async fn summary<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(farmer_id): Path<UserId>,
) -> Result<Json<InventorySummary>, ApiError> {
    Ok(Json(
        state.products.farmer_inventory_summary(&farmer_id).await?,
    ))
}
