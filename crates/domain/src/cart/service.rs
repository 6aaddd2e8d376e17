use common::{ProductId, UserId};
use document_store::{DocumentStore, DocumentStoreExt, Query};

use super::{CartError, CartItem};
use crate::collections;
use crate::error::Result;
use crate::money::Rupiah;
use crate::product::Product;

/// Service for a user's cart lines.
pub struct CartService<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> CartService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Puts a product in the cart with the given quantity.
    ///
    /// Adding a product that is already in the cart overwrites that line.
    #[tracing::instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_to_cart(
        &self,
        user_id: &UserId,
        product: &Product,
        quantity: i64,
    ) -> Result<CartItem> {
        if product.id.is_empty() {
            return Err(CartError::MissingProductId.into());
        }
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity { quantity }.into());
        }

        let item = CartItem::new(product, quantity);
        self.store
            .set(collections::cart_line(user_id, &product.id), &item)
            .await?;
        Ok(item)
    }

    /// Removes one line. Removing a missing line is not an error.
    #[tracing::instrument(skip(self))]
    pub async fn remove_from_cart(&self, user_id: &UserId, product_id: &ProductId) -> Result<()> {
        self.store
            .delete(collections::cart_line(user_id, product_id))
            .await?;
        Ok(())
    }

    /// Lists the user's cart lines.
    pub async fn cart_items(&self, user_id: &UserId) -> Result<Vec<CartItem>> {
        Ok(self
            .store
            .query_as(&Query::collection(collections::cart(user_id)))
            .await?)
    }

    /// Resolves a selection of product ids to the user's stored cart lines,
    /// in selection order.
    pub async fn selected_items(
        &self,
        user_id: &UserId,
        product_ids: &[ProductId],
    ) -> Result<Vec<CartItem>> {
        let mut items = Vec::with_capacity(product_ids.len());
        for product_id in product_ids {
            let item: Option<CartItem> = self
                .store
                .get_as(&collections::cart_line(user_id, product_id))
                .await?;
            match item {
                Some(item) => items.push(item),
                None => {
                    return Err(CartError::NotInCart {
                        product_id: product_id.clone(),
                    }
                    .into());
                }
            }
        }
        Ok(items)
    }

    /// Sums price × quantity over the given lines.
    pub fn total_price(items: &[CartItem]) -> Rupiah {
        super::total_price(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainError;
    use crate::product::Category;
    use document_store::InMemoryDocumentStore;

    fn product(id: &str, price: i64) -> Product {
        let mut p = Product::new("f-1", id, Rupiah::new(price), 50, Category::SayurDaun);
        p.id = ProductId::new(id);
        p
    }

    #[tokio::test]
    async fn test_add_overwrites_existing_line() {
        let cart = CartService::new(InMemoryDocumentStore::new());
        let uid = UserId::new("u-1");
        let bayam = product("p-1", 5_000);

        cart.add_to_cart(&uid, &bayam, 2).await.unwrap();
        cart.add_to_cart(&uid, &bayam, 5).await.unwrap();

        let items = cart.cart_items(&uid).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity(), 5);
    }

    #[tokio::test]
    async fn test_add_validates_input() {
        let cart = CartService::new(InMemoryDocumentStore::new());
        let uid = UserId::new("u-1");

        let zero = cart.add_to_cart(&uid, &product("p-1", 5_000), 0).await;
        assert!(matches!(
            zero,
            Err(DomainError::Cart(CartError::InvalidQuantity { quantity: 0 }))
        ));

        let mut unsaved = product("p-1", 5_000);
        unsaved.id = ProductId::default();
        let missing = cart.add_to_cart(&uid, &unsaved, 1).await;
        assert!(matches!(
            missing,
            Err(DomainError::Cart(CartError::MissingProductId))
        ));
        assert!(cart.cart_items(&uid).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_carts_are_per_user() {
        let cart = CartService::new(InMemoryDocumentStore::new());
        cart.add_to_cart(&UserId::new("u-1"), &product("p-1", 1_000), 1)
            .await
            .unwrap();

        assert!(cart.cart_items(&UserId::new("u-2")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_and_total() {
        let cart = CartService::new(InMemoryDocumentStore::new());
        let uid = UserId::new("u-1");
        cart.add_to_cart(&uid, &product("p-1", 5_000), 2).await.unwrap();
        cart.add_to_cart(&uid, &product("p-2", 3_000), 3).await.unwrap();

        let items = cart.cart_items(&uid).await.unwrap();
        assert_eq!(CartService::<InMemoryDocumentStore>::total_price(&items), Rupiah::new(19_000));

        cart.remove_from_cart(&uid, &ProductId::new("p-1")).await.unwrap();
        let items = cart.cart_items(&uid).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id().as_str(), "p-2");
    }

    #[tokio::test]
    async fn test_selected_items_must_be_in_cart() {
        let cart = CartService::new(InMemoryDocumentStore::new());
        let uid = UserId::new("u-1");
        cart.add_to_cart(&uid, &product("p-1", 5_000), 2).await.unwrap();

        let selected = cart
            .selected_items(&uid, &[ProductId::new("p-1")])
            .await
            .unwrap();
        assert_eq!(selected.len(), 1);

        let missing = cart
            .selected_items(&uid, &[ProductId::new("p-1"), ProductId::new("p-9")])
            .await;
        assert!(matches!(
            missing,
            Err(DomainError::Cart(CartError::NotInCart { .. }))
        ));
    }
}
