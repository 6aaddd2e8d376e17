//! Notification endpoints, including a live server-sent event feed.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use common::{NotificationId, UserId};
use document_store::{DocumentStore, listen};
use domain::{Notification, user_notifications};
use futures_util::{Stream, StreamExt};

use crate::AppState;
use crate::error::ApiError;

/// GET /users/:id/notifications: newest first.
#[tracing::instrument(skip(state))]
pub async fn list<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    Ok(Json(
        state.notifications.notifications_for_user(&user_id).await?,
    ))
}

/// GET /users/:id/notifications/stream
///
/// Sends the user's full notification list and unread count as a
/// `notifications` event whenever it changes. The store listener is
/// removed when the client disconnects.
#[tracing::instrument(skip(state))]
pub async fn stream<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<UserId>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let snapshots = listen(state.store.clone(), user_notifications(&user_id)).into_stream();

    let events = snapshots.filter_map(|snapshot| async move {
        let notifications = match snapshot.and_then(|s| s.to_objects::<Notification>()) {
            Ok(notifications) => notifications,
            Err(e) => {
                tracing::warn!(error = %e, "dropping notification snapshot");
                return None;
            }
        };
        let unread_count = notifications.iter().filter(|n| !n.is_read).count();
        let payload = serde_json::json!({
            "unread_count": unread_count,
            "notifications": notifications,
        });
        match Event::default().event("notifications").json_data(payload) {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode notification event");
                None
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

/// POST /notifications/:id/read
#[tracing::instrument(skip(state))]
pub async fn mark_read<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<NotificationId>,
) -> Result<StatusCode, ApiError> {
    state.notifications.mark_as_read(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
