//! Product service.

use common::{ProductId, UserId};
use document_store::{DocumentStore, DocumentStoreExt, Query, WriteBatch, to_fields};
use serde::{Deserialize, Serialize};

use super::{CatalogFilter, Product, ProductError, ProductUpdate};
use crate::collections;
use crate::error::{DomainError, Result};

/// Stock overview for a farmer's dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InventorySummary {
    pub product_count: usize,
    pub total_stock: i64,
}

/// Service for managing product listings.
pub struct ProductService<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> ProductService<S> {
    /// Creates a new product service with the given document store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Lists a new product under a fresh id.
    #[tracing::instrument(skip(self, product), fields(farmer_id = %product.farmer_id))]
    pub async fn add_product(&self, mut product: Product) -> Result<Product> {
        if product.farmer_id.is_empty() {
            return Err(DomainError::required("farmer_id"));
        }
        product.validate()?;

        product.id = ProductId::new(self.store.generate_id());
        self.store
            .set(collections::product(&product.id), &product)
            .await?;

        tracing::info!(product_id = %product.id, "product listed");
        Ok(product)
    }

    /// Reads a single product.
    pub async fn get_product(&self, id: &ProductId) -> Result<Option<Product>> {
        Ok(self.store.get_as(&collections::product(id)).await?)
    }

    /// Replaces the editable fields of a product owned by `farmer_id`.
    ///
    /// The write is conditional on the version that was read, so an edit
    /// racing a checkout fails with a conflict instead of restoring stale
    /// stock.
    #[tracing::instrument(skip(self, update))]
    pub async fn edit_product(
        &self,
        farmer_id: &UserId,
        id: &ProductId,
        update: ProductUpdate,
    ) -> Result<Product> {
        let path = collections::product(id);
        let doc = self
            .store
            .get(&path)
            .await?
            .ok_or_else(|| DomainError::not_found("product", id))?;
        let current: Product = doc.deserialize()?;
        ensure_owner(&current, farmer_id)?;

        let edited = update.apply_to(&current);
        edited.validate()?;

        self.store
            .commit(WriteBatch::new().update_at_version(path, to_fields(&edited)?, doc.version))
            .await
            .map_err(|e| DomainError::from_store("product", e))?;

        tracing::info!(product_id = %id, "product edited");
        Ok(edited)
    }

    /// Removes a product owned by `farmer_id`.
    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, farmer_id: &UserId, id: &ProductId) -> Result<()> {
        let current = self
            .get_product(id)
            .await?
            .ok_or_else(|| DomainError::not_found("product", id))?;
        ensure_owner(&current, farmer_id)?;

        self.store.delete(collections::product(id)).await?;
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }

    /// Lists every product owned by one farmer.
    pub async fn products_by_farmer(&self, farmer_id: &UserId) -> Result<Vec<Product>> {
        let query = Query::collection(collections::PRODUCTS).where_eq("farmer_id", farmer_id.as_str());
        Ok(self.store.query_as(&query).await?)
    }

    /// Counts a farmer's listings and sums their stock.
    pub async fn farmer_inventory_summary(&self, farmer_id: &UserId) -> Result<InventorySummary> {
        let products = self.products_by_farmer(farmer_id).await?;
        Ok(InventorySummary {
            product_count: products.len(),
            total_stock: products
                .iter()
                .fold(0i64, |total, p| total.saturating_add(p.stock)),
        })
    }

    /// Lists every product in the marketplace.
    pub async fn all_products(&self) -> Result<Vec<Product>> {
        Ok(self
            .store
            .query_as(&Query::collection(collections::PRODUCTS))
            .await?)
    }

    /// Lists the products a consumer sees for the given filter.
    #[tracing::instrument(skip(self))]
    pub async fn catalog(&self, filter: &CatalogFilter) -> Result<Vec<Product>> {
        let products = self.all_products().await?;
        Ok(filter.apply(products))
    }
}

fn ensure_owner(product: &Product, farmer_id: &UserId) -> Result<()> {
    if &product.farmer_id != farmer_id {
        return Err(ProductError::NotOwner {
            product_id: product.id.clone(),
            farmer_id: farmer_id.clone(),
        }
        .into());
    }
    Ok(())
}
