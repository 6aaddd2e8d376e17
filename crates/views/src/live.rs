//! Listener ownership and position tracking for read models.

use std::sync::Arc;

use async_trait::async_trait;
use document_store::{
    DocumentStore, DocumentStoreError, ListenerRegistration, Query, QuerySnapshot,
    SnapshotHandler, add_snapshot_listener,
};
use tokio::sync::{Mutex, watch};

use crate::ReadModel;

/// Tracks how many snapshots a view has applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewPosition {
    /// Number of snapshots applied since the view was created.
    pub snapshots_applied: u64,
}

impl ViewPosition {
    /// Creates a new position at zero.
    pub fn zero() -> Self {
        Self {
            snapshots_applied: 0,
        }
    }

    /// Advances the position by one snapshot.
    pub fn advance(&self) -> Self {
        Self {
            snapshots_applied: self.snapshots_applied + 1,
        }
    }
}

impl std::fmt::Display for ViewPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "position({})", self.snapshots_applied)
    }
}

/// A read model plus the listener that keeps it current.
///
/// At most one listener is active per view. Watching again replaces the
/// previous listener once its task has ended.
pub struct LiveView<M: ReadModel> {
    model: Arc<M>,
    position: Arc<watch::Sender<ViewPosition>>,
    listener: Mutex<Option<ListenerRegistration>>,
}

impl<M: ReadModel> LiveView<M> {
    /// Wraps a read model. Nothing is watched until [`LiveView::watch`].
    pub fn new(model: M) -> Self {
        let (position, _) = watch::channel(ViewPosition::zero());
        Self {
            model: Arc::new(model),
            position: Arc::new(position),
            listener: Mutex::new(None),
        }
    }

    /// Returns the read model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Starts applying snapshots of `query`, replacing any earlier listener.
    pub async fn watch<S>(&self, store: S, query: Query)
    where
        S: DocumentStore + 'static,
    {
        let handler = ModelHandler {
            model: self.model.clone(),
            position: self.position.clone(),
        };
        let registration = add_snapshot_listener(store, query, handler);

        let previous = self.listener.lock().await.replace(registration);
        if let Some(previous) = previous {
            tracing::debug!(view = self.model.name(), "replacing view listener");
            previous.shutdown().await;
        }
    }

    /// Stops the listener and waits for its task to end. The state is kept.
    pub async fn stop(&self) {
        let registration = self.listener.lock().await.take();
        if let Some(registration) = registration {
            registration.shutdown().await;
        }
    }

    /// Returns true while a listener is registered.
    pub async fn is_watching(&self) -> bool {
        self.listener
            .lock()
            .await
            .as_ref()
            .is_some_and(ListenerRegistration::is_active)
    }

    /// Stops the listener and clears the state.
    pub async fn close(&self) {
        self.stop().await;
        self.model.reset().await;
    }

    /// Returns the current position.
    pub fn position(&self) -> ViewPosition {
        *self.position.borrow()
    }

    /// Subscribes to position changes, one per applied snapshot.
    pub fn updates(&self) -> watch::Receiver<ViewPosition> {
        self.position.subscribe()
    }
}

struct ModelHandler<M: ReadModel> {
    model: Arc<M>,
    position: Arc<watch::Sender<ViewPosition>>,
}

#[async_trait]
impl<M: ReadModel> SnapshotHandler for ModelHandler<M> {
    async fn on_snapshot(&self, snapshot: QuerySnapshot) {
        match self.model.apply(&snapshot).await {
            Ok(()) => {
                self.position.send_modify(|p| *p = p.advance());
                tracing::trace!(
                    view = self.model.name(),
                    documents = snapshot.len(),
                    "snapshot applied"
                );
            }
            Err(e) => {
                tracing::warn!(view = self.model.name(), error = %e, "failed to apply snapshot");
            }
        }
    }

    async fn on_error(&self, error: DocumentStoreError) {
        metrics::counter!("view_listener_errors", "view" => self.model.name()).increment(1);
        tracing::warn!(view = self.model.name(), error = %error, "view listener query failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_advances_by_one() {
        let position = ViewPosition::zero().advance().advance();
        assert_eq!(position.snapshots_applied, 2);
        assert_eq!(position.to_string(), "position(2)");
    }
}
