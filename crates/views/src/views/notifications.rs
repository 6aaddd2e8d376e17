//! Notifications read model.

use async_trait::async_trait;
use common::UserId;
use document_store::{Query, QuerySnapshot};
use domain::{Notification, user_notifications};
use tokio::sync::RwLock;

use crate::Result;
use crate::read_model::ReadModel;

/// Read model view of a user's notifications, newest first.
#[derive(Default)]
pub struct NotificationsView {
    notifications: RwLock<Vec<Notification>>,
}

impl NotificationsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(user_id: &UserId) -> Query {
        user_notifications(user_id)
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.notifications.read().await.clone()
    }

    /// Number of notifications not yet read; drives the badge.
    pub async fn unread_count(&self) -> usize {
        self.notifications
            .read()
            .await
            .iter()
            .filter(|n| !n.is_read)
            .count()
    }
}

#[async_trait]
impl ReadModel for NotificationsView {
    fn name(&self) -> &'static str {
        "NotificationsView"
    }

    async fn apply(&self, snapshot: &QuerySnapshot) -> Result<()> {
        let notifications: Vec<Notification> = snapshot.to_objects()?;
        *self.notifications.write().await = notifications;
        Ok(())
    }

    async fn reset(&self) {
        self.notifications.write().await.clear();
    }

    async fn count(&self) -> usize {
        self.notifications.read().await.len()
    }
}
