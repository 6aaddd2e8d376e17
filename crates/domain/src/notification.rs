//! Per-user notifications.

use chrono::{DateTime, Utc};
use common::{NotificationId, UserId};
use document_store::{Direction, DocumentStore, DocumentStoreExt, Fields, Query};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::collections;
use crate::error::{DomainError, Result};

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Order,
    Promo,
    #[default]
    #[serde(other)]
    Info,
}

/// A message shown in a user's notification list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
}

/// Service for writing and reading notifications.
pub struct NotificationService<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> NotificationService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Writes an unread notification for a user.
    #[tracing::instrument(skip(self, message))]
    pub async fn send(
        &self,
        user_id: &UserId,
        title: &str,
        message: &str,
        kind: NotificationKind,
    ) -> Result<Notification> {
        let notification = Notification {
            id: NotificationId::new(self.store.generate_id()),
            user_id: user_id.clone(),
            title: title.to_string(),
            message: message.to_string(),
            timestamp: Utc::now(),
            is_read: false,
            kind,
        };
        self.store
            .set(collections::notification(&notification.id), &notification)
            .await?;
        Ok(notification)
    }

    /// Sends a notification, logging instead of failing.
    ///
    /// Used after a primary write has already committed.
    pub(crate) async fn send_best_effort(
        &self,
        user_id: &UserId,
        title: &str,
        message: &str,
        kind: NotificationKind,
    ) {
        if let Err(e) = self.send(user_id, title, message, kind).await {
            tracing::warn!(user_id = %user_id, error = %e, "failed to send notification");
        }
    }

    /// Lists a user's notifications, newest first.
    pub async fn notifications_for_user(&self, user_id: &UserId) -> Result<Vec<Notification>> {
        Ok(self.store.query_as(&user_notifications(user_id)).await?)
    }

    /// Marks one notification as read.
    #[tracing::instrument(skip(self))]
    pub async fn mark_as_read(&self, id: &NotificationId) -> Result<()> {
        let mut fields = Fields::new();
        fields.insert("is_read".to_string(), Value::Bool(true));
        self.store
            .update(collections::notification(id), fields)
            .await
            .map_err(|e| DomainError::from_store("notification", e))?;
        Ok(())
    }

    /// Counts a user's unread notifications.
    pub async fn unread_count(&self, user_id: &UserId) -> Result<usize> {
        let query = Query::collection(collections::NOTIFICATIONS)
            .where_eq("user_id", user_id.as_str())
            .where_eq("is_read", false);
        Ok(self.store.query(&query).await?.len())
    }
}

/// A user's notifications, newest first.
pub fn user_notifications(user_id: &UserId) -> Query {
    Query::collection(collections::NOTIFICATIONS)
        .where_eq("user_id", user_id.as_str())
        .order_by("timestamp", Direction::Descending)
}
