//! The live views of one signed-in user.

use common::UserId;
use document_store::DocumentStore;
use domain::Role;

use crate::live::LiveView;
use crate::views::{CartView, IncomingOrdersView, MyOrdersView, NotificationsView, ProfileView};

/// Groups the live views of one user.
///
/// Consumers get cart, order, notification, and profile views. Farmers
/// additionally get the incoming-orders dashboard.
pub struct Session<S: DocumentStore + Clone + 'static> {
    store: S,
    user_id: UserId,
    role: Role,
    pub cart: LiveView<CartView>,
    pub my_orders: LiveView<MyOrdersView>,
    pub notifications: LiveView<NotificationsView>,
    pub profile: LiveView<ProfileView>,
    pub incoming_orders: Option<LiveView<IncomingOrdersView>>,
}

impl<S: DocumentStore + Clone + 'static> Session<S> {
    /// Creates the views for a user and starts every listener.
    #[tracing::instrument(skip(store))]
    pub async fn start(store: S, user_id: UserId, role: Role) -> Self {
        let incoming_orders = match role {
            Role::Petani => Some(LiveView::new(IncomingOrdersView::new(user_id.clone()))),
            Role::Konsumen => None,
        };

        let session = Self {
            store,
            user_id,
            role,
            cart: LiveView::new(CartView::new()),
            my_orders: LiveView::new(MyOrdersView::new()),
            notifications: LiveView::new(NotificationsView::new()),
            profile: LiveView::new(ProfileView::new()),
            incoming_orders,
        };
        session.watch_all().await;

        tracing::info!("session started");
        session
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Registers every listener again, replacing the current ones.
    pub async fn watch_all(&self) {
        let uid = &self.user_id;
        self.cart
            .watch(self.store.clone(), CartView::query(uid))
            .await;
        self.my_orders
            .watch(self.store.clone(), MyOrdersView::query(uid))
            .await;
        self.notifications
            .watch(self.store.clone(), NotificationsView::query(uid))
            .await;
        self.profile
            .watch(self.store.clone(), ProfileView::query(uid))
            .await;
        if let Some(incoming) = &self.incoming_orders {
            incoming
                .watch(self.store.clone(), IncomingOrdersView::query())
                .await;
        }
    }

    /// Removes every listener and clears all local state.
    #[tracing::instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn logout(&self) {
        self.cart.close().await;
        self.my_orders.close().await;
        self.notifications.close().await;
        self.profile.close().await;
        if let Some(incoming) = &self.incoming_orders {
            incoming.close().await;
        }
        tracing::info!("session closed");
    }
}
