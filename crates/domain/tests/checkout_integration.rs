//! Integration tests for checkout and the order lifecycle.
//!
//! These tests verify that checkout applies its order, stock, and cart
//! writes as one unit, and that orders then move through their statuses.

use std::sync::Arc;

use common::{ProductId, UserId};
use document_store::{DocumentStoreExt, InMemoryDocumentStore};
use domain::collections;
use domain::{
    Actor, CartService, Category, Checkout, CheckoutError, CheckoutService, DomainError,
    NotificationKind, NotificationService, OrderService, OrderStatus, Product, ProductService,
    Rupiah,
};

struct Marketplace {
    store: InMemoryDocumentStore,
    products: ProductService<InMemoryDocumentStore>,
    cart: CartService<InMemoryDocumentStore>,
    checkout: CheckoutService<InMemoryDocumentStore>,
    orders: OrderService<InMemoryDocumentStore>,
    notifications: NotificationService<InMemoryDocumentStore>,
}

fn marketplace() -> Marketplace {
    let store = InMemoryDocumentStore::new();
    Marketplace {
        products: ProductService::new(store.clone()),
        cart: CartService::new(store.clone()),
        checkout: CheckoutService::new(store.clone()),
        orders: OrderService::new(store.clone()),
        notifications: NotificationService::new(store.clone()),
        store,
    }
}

async fn list(m: &Marketplace, farmer: &str, name: &str, price: i64, stock: i64) -> Product {
    m.products
        .add_product(Product::new(
            farmer,
            name,
            Rupiah::new(price),
            stock,
            Category::SayurDaun,
        ))
        .await
        .unwrap()
}

async fn stock_of(m: &Marketplace, id: &ProductId) -> i64 {
    m.products.get_product(id).await.unwrap().unwrap().stock
}

fn request(uid: &UserId, items: Vec<domain::CartItem>) -> Checkout {
    Checkout {
        user_id: uid.clone(),
        email: "budi@example.com".to_string(),
        address: "Jl. Kaliurang KM 5".to_string(),
        items,
    }
}

mod checkout_batch {
    use super::*;

    #[tokio::test]
    async fn creates_order_decrements_stock_and_clears_selected_lines() {
        let m = marketplace();
        let uid = UserId::new("u-1");
        let bayam = list(&m, "f-1", "Bayam", 5_000, 10).await;
        let wortel = list(&m, "f-2", "Wortel", 8_000, 4).await;
        let cabai = list(&m, "f-1", "Cabai", 30_000, 2).await;

        m.cart.add_to_cart(&uid, &bayam, 3).await.unwrap();
        m.cart.add_to_cart(&uid, &wortel, 4).await.unwrap();
        m.cart.add_to_cart(&uid, &cabai, 1).await.unwrap();

        let selected = m
            .cart
            .selected_items(&uid, &[bayam.id.clone(), wortel.id.clone()])
            .await
            .unwrap();
        let order = m.checkout.checkout(request(&uid, selected)).await.unwrap();

        assert!(order.order_id.as_str().starts_with("ORD-"));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_price, Rupiah::new(47_000));
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.consumer_address, "Jl. Kaliurang KM 5");

        assert_eq!(stock_of(&m, &bayam.id).await, 7);
        assert_eq!(stock_of(&m, &wortel.id).await, 0);
        assert_eq!(stock_of(&m, &cabai.id).await, 2);

        let remaining = m.cart.cart_items(&uid).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].product_id(), &cabai.id);

        let stored = m.orders.get_order(&order.order_id).await.unwrap().unwrap();
        assert_eq!(stored, order);
    }

    #[tokio::test]
    async fn notifies_consumer_after_success() {
        let m = marketplace();
        let uid = UserId::new("u-1");
        let bayam = list(&m, "f-1", "Bayam", 5_000, 10).await;
        m.cart.add_to_cart(&uid, &bayam, 1).await.unwrap();

        let items = m.cart.cart_items(&uid).await.unwrap();
        let order = m.checkout.checkout(request(&uid, items)).await.unwrap();

        let notes = m.notifications.notifications_for_user(&uid).await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "Pesanan Berhasil");
        assert_eq!(
            notes[0].message,
            format!("Pesanan #{} telah dibuat.", order.order_id)
        );
        assert_eq!(notes[0].kind, NotificationKind::Order);
    }

    #[tokio::test]
    async fn insufficient_stock_applies_nothing() {
        let m = marketplace();
        let uid = UserId::new("u-1");
        let bayam = list(&m, "f-1", "Bayam", 5_000, 10).await;
        let wortel = list(&m, "f-2", "Wortel", 8_000, 1).await;

        m.cart.add_to_cart(&uid, &bayam, 2).await.unwrap();
        m.cart.add_to_cart(&uid, &wortel, 3).await.unwrap();
        let items = m.cart.cart_items(&uid).await.unwrap();

        let result = m.checkout.checkout(request(&uid, items)).await;
        match result {
            Err(DomainError::Checkout(CheckoutError::InsufficientStock { product_id })) => {
                assert_eq!(product_id, wortel.id);
            }
            other => panic!("expected insufficient stock, got {other:?}"),
        }

        assert_eq!(stock_of(&m, &bayam.id).await, 10);
        assert_eq!(stock_of(&m, &wortel.id).await, 1);
        assert_eq!(m.cart.cart_items(&uid).await.unwrap().len(), 2);
        assert_eq!(
            m.store.document_count(&collections::ORDERS.into()).await,
            0
        );
        assert!(
            m.notifications
                .notifications_for_user(&uid)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn deleted_product_fails_checkout() {
        let m = marketplace();
        let uid = UserId::new("u-1");
        let bayam = list(&m, "f-1", "Bayam", 5_000, 10).await;
        m.cart.add_to_cart(&uid, &bayam, 2).await.unwrap();
        m.products
            .delete_product(&UserId::new("f-1"), &bayam.id)
            .await
            .unwrap();

        let items = m.cart.cart_items(&uid).await.unwrap();
        let result = m.checkout.checkout(request(&uid, items)).await;
        assert!(matches!(
            result,
            Err(DomainError::Checkout(CheckoutError::ProductUnavailable { .. }))
        ));
        assert_eq!(m.cart.cart_items(&uid).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_checkouts_never_oversell() {
        let m = Arc::new(marketplace());
        let bayam = list(&m, "f-1", "Bayam", 5_000, 5).await;

        let mut handles = Vec::new();
        for i in 0..10 {
            let m = m.clone();
            let bayam = bayam.clone();
            handles.push(tokio::spawn(async move {
                let uid = UserId::new(format!("u-{i}"));
                m.cart.add_to_cart(&uid, &bayam, 1).await.unwrap();
                let items = m.cart.cart_items(&uid).await.unwrap();
                m.checkout.checkout(request(&uid, items)).await.is_ok()
            }));
        }

        let mut placed = 0;
        for handle in handles {
            if handle.await.unwrap() {
                placed += 1;
            }
        }

        assert_eq!(placed, 5);
        assert_eq!(stock_of(&m, &bayam.id).await, 0);
        assert_eq!(
            m.store.document_count(&collections::ORDERS.into()).await,
            5
        );
    }
}

mod order_lifecycle {
    use super::*;

    #[tokio::test]
    async fn farmer_ships_and_consumer_confirms() {
        let m = marketplace();
        let uid = UserId::new("u-1");
        let farmer = UserId::new("f-1");
        let bayam = list(&m, "f-1", "Bayam", 5_000, 10).await;
        m.cart.add_to_cart(&uid, &bayam, 2).await.unwrap();
        let items = m.cart.cart_items(&uid).await.unwrap();
        let order = m.checkout.checkout(request(&uid, items)).await.unwrap();

        assert!(m.orders.has_pending_orders_for_farmer(&farmer).await.unwrap());
        let incoming = m.orders.incoming_orders_for_farmer(&farmer).await.unwrap();
        assert_eq!(incoming.len(), 1);

        let as_farmer = Actor::Farmer(farmer.clone());
        let mut status = order.status;
        while let Some(next) = status.next().filter(|s| *s != OrderStatus::Selesai) {
            status = m
                .orders
                .update_status(&order.order_id, &as_farmer, next)
                .await
                .unwrap()
                .status;
        }
        assert_eq!(status, OrderStatus::Dikirim);
        assert!(!m.orders.has_pending_orders_for_farmer(&farmer).await.unwrap());

        let done = m
            .orders
            .update_status(&order.order_id, &Actor::Consumer(uid.clone()), OrderStatus::Selesai)
            .await
            .unwrap();
        assert!(done.status.is_finished());

        let mine = m.orders.orders_for_consumer(&uid).await.unwrap();
        assert_eq!(mine[0].status, OrderStatus::Selesai);

        // One for the checkout, one per status change.
        assert_eq!(m.notifications.unread_count(&uid).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn product_ids_are_stable_document_ids() {
        let m = marketplace();
        let bayam = list(&m, "f-1", "Bayam", 5_000, 10).await;
        assert!(m.store.exists(&collections::product(&bayam.id)).await.unwrap());
    }
}
