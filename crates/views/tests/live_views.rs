//! Integration tests: domain services → document store → live views.

use std::time::Duration;

use common::UserId;
use document_store::InMemoryDocumentStore;
use domain::{
    Actor, CartService, Category, Checkout, CheckoutService, NotificationKind,
    NotificationService, OrderService, OrderStatus, Product, ProductService, Role, Rupiah,
    UserProfile, UserService,
};
use views::{CartView, LiveView, ReadModel, Session};

/// Waits until `$ready` holds for the view's model, re-checking after every
/// applied snapshot.
macro_rules! settle {
    ($view:expr, |$m:ident| $ready:expr) => {{
        let view = &$view;
        let mut updates = view.updates();
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                let $m = view.model();
                if $ready {
                    break;
                }
                updates.changed().await.expect("position sender dropped");
            }
        })
        .await
        .expect("view did not settle");
    }};
}

async fn seed_product(store: &InMemoryDocumentStore, farmer: &str, stock: i64) -> Product {
    ProductService::new(store.clone())
        .add_product(Product::new(
            farmer,
            "Bayam",
            Rupiah::new(5_000),
            stock,
            Category::SayurDaun,
        ))
        .await
        .unwrap()
}

fn consumer(uid: &str) -> UserProfile {
    UserProfile {
        uid: UserId::new(uid),
        name: "Budi".to_string(),
        email: format!("{uid}@example.com"),
        role: Role::Konsumen,
        address: "Jl. Kaliurang".to_string(),
        phone: String::new(),
        store_name: None,
        farm_address: String::new(),
        lat: 0.0,
        lng: 0.0,
    }
}

fn checkout_of(user_id: &UserId, items: Vec<domain::CartItem>) -> Checkout {
    Checkout {
        user_id: user_id.clone(),
        email: format!("{user_id}@example.com"),
        address: "Jl. Kaliurang".to_string(),
        items,
    }
}

#[tokio::test]
async fn test_cart_view_follows_cart_writes() {
    let store = InMemoryDocumentStore::new();
    let uid = UserId::new("u-1");
    let bayam = seed_product(&store, "f-1", 10).await;
    let cart = CartService::new(store.clone());

    let view = LiveView::new(CartView::new());
    view.watch(store.clone(), CartView::query(&uid)).await;

    cart.add_to_cart(&uid, &bayam, 3).await.unwrap();
    settle!(view, |m| m.count().await == 1);
    assert_eq!(view.model().total_price().await, Rupiah::new(15_000));

    cart.remove_from_cart(&uid, &bayam.id).await.unwrap();
    settle!(view, |m| m.count().await == 0);
    assert!(view.position().snapshots_applied >= 2);
}

#[tokio::test]
async fn test_watch_again_replaces_listener() {
    let store = InMemoryDocumentStore::new();
    let bayam = seed_product(&store, "f-1", 10).await;
    let cart = CartService::new(store.clone());
    let first = UserId::new("u-1");
    let second = UserId::new("u-2");

    let view = LiveView::new(CartView::new());
    view.watch(store.clone(), CartView::query(&first)).await;
    view.watch(store.clone(), CartView::query(&second)).await;

    cart.add_to_cart(&second, &bayam, 1).await.unwrap();
    settle!(view, |m| m.count().await == 1);

    let before = view.position();
    cart.add_to_cart(&first, &bayam, 4).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(view.position(), before);
    assert_eq!(view.model().items().await[0].quantity(), 1);
}

#[tokio::test]
async fn test_consumer_session_tracks_checkout_and_status() {
    let store = InMemoryDocumentStore::new();
    let uid = UserId::new("u-1");
    UserService::new(store.clone())
        .create_profile(consumer("u-1"))
        .await
        .unwrap();
    let bayam = seed_product(&store, "f-1", 10).await;

    let session = Session::start(store.clone(), uid.clone(), Role::Konsumen).await;
    assert!(session.incoming_orders.is_none());
    settle!(session.profile, |m| m.profile().await.is_some());

    CartService::new(store.clone())
        .add_to_cart(&uid, &bayam, 2)
        .await
        .unwrap();
    settle!(session.cart, |m| m.count().await == 1);

    let items = session.cart.model().items().await;
    let order = CheckoutService::new(store.clone())
        .checkout(checkout_of(&uid, items))
        .await
        .unwrap();

    settle!(session.cart, |m| m.count().await == 0);
    settle!(session.my_orders, |m| m.count().await == 1);
    settle!(session.notifications, |m| m.unread_count().await == 1);
    assert_eq!(session.my_orders.model().ongoing().await.len(), 1);

    let orders = OrderService::new(store.clone());
    orders
        .update_status(
            &order.order_id,
            &Actor::Farmer(UserId::new("f-1")),
            OrderStatus::Dikirim,
        )
        .await
        .unwrap();
    orders
        .update_status(
            &order.order_id,
            &Actor::Consumer(uid.clone()),
            OrderStatus::Selesai,
        )
        .await
        .unwrap();

    settle!(session.my_orders, |m| m.finished().await.len() == 1);
    assert!(session.my_orders.model().ongoing().await.is_empty());
    settle!(session.notifications, |m| m.unread_count().await == 3);
}

#[tokio::test]
async fn test_farmer_session_raises_and_resets_new_order_flag() {
    let store = InMemoryDocumentStore::new();
    let farmer_id = UserId::new("f-1");
    let bayam = seed_product(&store, "f-1", 10).await;
    let other = seed_product(&store, "f-2", 10).await;

    let session = Session::start(store.clone(), farmer_id.clone(), Role::Petani).await;
    let incoming = session.incoming_orders.as_ref().unwrap();
    settle!(*incoming, |_m| incoming.position().snapshots_applied >= 1);
    assert!(!incoming.model().has_new_orders());

    let buyer = UserId::new("u-1");
    let cart = CartService::new(store.clone());
    let checkout = CheckoutService::new(store.clone());

    // Someone else's product: not part of this farmer's dashboard.
    cart.add_to_cart(&buyer, &other, 1).await.unwrap();
    checkout
        .checkout(checkout_of(&buyer, cart.cart_items(&buyer).await.unwrap()))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!incoming.model().has_new_orders());
    assert_eq!(incoming.model().count().await, 0);

    cart.add_to_cart(&buyer, &bayam, 1).await.unwrap();
    let order = checkout
        .checkout(checkout_of(&buyer, cart.cart_items(&buyer).await.unwrap()))
        .await
        .unwrap();

    settle!(*incoming, |m| m.count().await == 1);
    assert!(incoming.model().has_new_orders());

    incoming.model().reset_new_order_flag();
    assert!(!incoming.model().has_new_orders());

    OrderService::new(store.clone())
        .update_status(
            &order.order_id,
            &Actor::Farmer(farmer_id),
            OrderStatus::Dikonfirmasi,
        )
        .await
        .unwrap();
    settle!(*incoming, |m| m.orders().await[0].status
        == OrderStatus::Dikonfirmasi);
    assert!(!incoming.model().has_new_orders());
}

#[tokio::test]
async fn test_logout_removes_listeners_and_clears_state() {
    let store = InMemoryDocumentStore::new();
    let uid = UserId::new("u-1");
    let bayam = seed_product(&store, "f-1", 10).await;
    let cart = CartService::new(store.clone());
    cart.add_to_cart(&uid, &bayam, 1).await.unwrap();
    NotificationService::new(store.clone())
        .send(&uid, "Halo", "Selamat datang", NotificationKind::Info)
        .await
        .unwrap();

    let session = Session::start(store.clone(), uid.clone(), Role::Konsumen).await;
    settle!(session.cart, |m| m.count().await == 1);
    settle!(session.notifications, |m| m.count().await == 1);

    session.logout().await;
    assert!(!session.cart.is_watching().await);
    assert_eq!(session.cart.model().count().await, 0);
    assert_eq!(session.notifications.model().count().await, 0);
    assert!(session.profile.model().profile().await.is_none());

    let position = session.cart.position();
    cart.add_to_cart(&uid, &bayam, 2).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(session.cart.position(), position);
    assert_eq!(session.cart.model().count().await, 0);
}

#[tokio::test]
async fn test_close_during_pending_write_leaves_view_empty() {
    let store = InMemoryDocumentStore::new();
    let uid = UserId::new("u-1");
    let bayam = seed_product(&store, "f-1", 10).await;
    let kangkung = seed_product(&store, "f-1", 10).await;
    let cart = CartService::new(store.clone());

    let view = LiveView::new(CartView::new());
    view.watch(store.clone(), CartView::query(&uid)).await;
    cart.add_to_cart(&uid, &bayam, 1).await.unwrap();
    settle!(view, |m| m.count().await == 1);

    // The listener has a re-read queued when the view closes.
    cart.add_to_cart(&uid, &kangkung, 1).await.unwrap();
    view.close().await;

    let position = view.position();
    assert!(!view.is_watching().await);
    assert_eq!(view.model().count().await, 0);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(view.position(), position);
    assert_eq!(view.model().count().await, 0);
}
