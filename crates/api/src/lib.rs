//! HTTP API server with observability for the TaniMart marketplace.
//!
//! Provides REST endpoints over the domain services for products, carts,
//! checkout, orders, notifications, and user profiles, with structured
//! logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use document_store::DocumentStore;
use domain::{
    CartService, CheckoutService, NotificationService, OrderService, ProductService, UserService,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState<S: DocumentStore + Clone + 'static> {
    pub products: ProductService<S>,
    pub cart: CartService<S>,
    pub checkout: CheckoutService<S>,
    pub orders: OrderService<S>,
    pub notifications: NotificationService<S>,
    pub users: UserService<S>,
    pub store: S,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: DocumentStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    use routes::{cart, checkout, notifications, orders, products, users};

    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/products",
            post(products::create::<S>).get(products::catalog::<S>),
        )
        .route(
            "/products/{id}",
            put(products::edit::<S>).delete(products::remove::<S>),
        )
        .route("/farmers/{id}/products", get(products::by_farmer::<S>))
        .route("/farmers/{id}/summary", get(products::summary::<S>))
        .route("/farmers/{id}/location", get(users::farm_address::<S>))
        .route("/farmers/{id}/orders", get(orders::incoming::<S>))
        .route("/users", post(users::create::<S>))
        .route("/users/{id}", get(users::get::<S>))
        .route("/users/{id}/address", put(users::update_address::<S>))
        .route(
            "/users/{id}/farm-location",
            put(users::update_farm_location::<S>),
        )
        .route("/users/{id}/addresses", get(users::addresses::<S>))
        .route("/users/{id}/cart", get(cart::get::<S>))
        .route(
            "/users/{id}/cart/{product_id}",
            put(cart::put_line::<S>).delete(cart::remove_line::<S>),
        )
        .route("/users/{id}/checkout", post(checkout::place::<S>))
        .route("/users/{id}/orders", get(orders::mine::<S>))
        .route("/orders/{id}/status", post(orders::update_status::<S>))
        .route("/users/{id}/notifications", get(notifications::list::<S>))
        .route(
            "/users/{id}/notifications/stream",
            get(notifications::stream::<S>),
        )
        .route("/notifications/{id}/read", post(notifications::mark_read::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state with every service backed by one store.
pub fn create_default_state<S: DocumentStore + Clone + 'static>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState {
        products: ProductService::new(store.clone()),
        cart: CartService::new(store.clone()),
        checkout: CheckoutService::new(store.clone()),
        orders: OrderService::new(store.clone()),
        notifications: NotificationService::new(store.clone()),
        users: UserService::new(store.clone()),
        store,
    })
}
