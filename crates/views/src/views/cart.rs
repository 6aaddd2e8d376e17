//! Cart read model: the user's cart lines.

use async_trait::async_trait;
use common::UserId;
use document_store::{Query, QuerySnapshot};
use domain::{CartItem, Rupiah, collections, total_price};
use tokio::sync::RwLock;

use crate::Result;
use crate::read_model::ReadModel;

/// Read model view of one user's cart.
#[derive(Default)]
pub struct CartView {
    items: RwLock<Vec<CartItem>>,
}

impl CartView {
    /// Creates a new empty cart view.
    pub fn new() -> Self {
        Self::default()
    }

    /// The query this view listens to.
    pub fn query(user_id: &UserId) -> Query {
        Query::collection(collections::cart(user_id))
    }

    /// Gets all cart lines.
    pub async fn items(&self) -> Vec<CartItem> {
        self.items.read().await.clone()
    }

    /// Sums price × quantity over every line.
    pub async fn total_price(&self) -> Rupiah {
        total_price(&self.items.read().await)
    }
}

#[async_trait]
impl ReadModel for CartView {
    fn name(&self) -> &'static str {
        "CartView"
    }

    async fn apply(&self, snapshot: &QuerySnapshot) -> Result<()> {
        let items: Vec<CartItem> = snapshot.to_objects()?;
        *self.items.write().await = items;
        Ok(())
    }

    async fn reset(&self) {
        self.items.write().await.clear();
    }

    async fn count(&self) -> usize {
        self.items.read().await.len()
    }
}
