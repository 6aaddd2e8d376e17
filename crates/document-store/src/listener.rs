//! Real-time snapshot listeners.
//!
//! A listener runs a query once when registered and again every time the
//! store's change feed reports a write to the query's collection. Each
//! listener receives the full result set, never a diff. Any number of
//! listeners share one change feed.

use std::pin::Pin;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_core::Stream;
use serde::de::DeserializeOwned;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::{ChangeNotice, Document, DocumentStore, DocumentStoreError, Query, Result};

/// Full result of a query at one point in time.
#[derive(Debug, Clone)]
pub struct QuerySnapshot {
    pub documents: Vec<Document>,
    pub read_at: DateTime<Utc>,
}

impl QuerySnapshot {
    /// Deserializes every document into a typed record.
    pub fn to_objects<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.documents.iter().map(Document::deserialize).collect()
    }

    /// Returns the number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if the query matched nothing.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Receives snapshots from a listener.
#[async_trait]
pub trait SnapshotHandler: Send + Sync + 'static {
    /// Called with every new snapshot.
    async fn on_snapshot(&self, snapshot: QuerySnapshot);

    /// Called when re-running the query fails. The listener keeps running.
    async fn on_error(&self, error: DocumentStoreError) {
        tracing::warn!(error = %error, "snapshot listener query failed");
    }
}

/// Handle to a running listener.
///
/// Dropping the registration stops the listener.
#[derive(Debug)]
pub struct ListenerRegistration {
    handle: Option<JoinHandle<()>>,
}

impl ListenerRegistration {
    /// Stops the listener. The task may still be finishing a delivery when
    /// this returns; use [`shutdown`](Self::shutdown) to wait for it.
    pub fn remove(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Stops the listener and waits until its task has ended. No snapshot
    /// reaches the handler after this returns.
    pub async fn shutdown(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            // Cancellation is the expected outcome.
            let _ = handle.await;
        }
    }

    /// Returns true while the listener task is running.
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ListenerRegistration {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Registers a snapshot listener that delivers to a handler.
///
/// The first snapshot is delivered as soon as the listener task runs.
pub fn add_snapshot_listener<S, H>(store: S, query: Query, handler: H) -> ListenerRegistration
where
    S: DocumentStore + 'static,
    H: SnapshotHandler,
{
    // Subscribe before the first read so no commit slips between them.
    let changes = store.changes();
    let handle = tokio::spawn(run_listener(store, query, changes, handler));
    ListenerRegistration {
        handle: Some(handle),
    }
}

/// A listener that delivers snapshots over a channel.
pub struct Listener {
    pub registration: ListenerRegistration,
    pub snapshots: mpsc::Receiver<Result<QuerySnapshot>>,
}

/// A stream of snapshots.
pub type SnapshotStream = Pin<Box<dyn Stream<Item = Result<QuerySnapshot>> + Send>>;

impl Listener {
    /// Turns the listener into a stream. The listener stops when the
    /// stream is dropped.
    pub fn into_stream(self) -> SnapshotStream {
        use futures_util::stream;

        let stream = stream::unfold(self, |mut listener| async move {
            let next = listener.snapshots.recv().await?;
            Some((next, listener))
        });
        Box::pin(stream)
    }
}

/// Registers a snapshot listener that delivers over a channel.
pub fn listen<S>(store: S, query: Query) -> Listener
where
    S: DocumentStore + 'static,
{
    let (tx, rx) = mpsc::channel(16);
    let registration = add_snapshot_listener(store, query, ChannelHandler { tx });
    Listener {
        registration,
        snapshots: rx,
    }
}

struct ChannelHandler {
    tx: mpsc::Sender<Result<QuerySnapshot>>,
}

#[async_trait]
impl SnapshotHandler for ChannelHandler {
    async fn on_snapshot(&self, snapshot: QuerySnapshot) {
        let _ = self.tx.send(Ok(snapshot)).await;
    }

    async fn on_error(&self, error: DocumentStoreError) {
        let _ = self.tx.send(Err(error)).await;
    }
}

#[tracing::instrument(skip_all, fields(collection = %query.collection))]
async fn run_listener<S, H>(
    store: S,
    query: Query,
    mut changes: broadcast::Receiver<ChangeNotice>,
    handler: H,
) where
    S: DocumentStore,
    H: SnapshotHandler,
{
    let mut last: Option<Vec<Document>> = None;
    deliver(&store, &query, &handler, &mut last).await;

    loop {
        match changes.recv().await {
            Ok(notice) => {
                if notice.collection != query.collection {
                    continue;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "listener lagged behind change feed, refreshing");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }

        // A batch publishes one notice per document; one re-read covers them all.
        while changes.try_recv().is_ok() {}

        deliver(&store, &query, &handler, &mut last).await;
    }
}

async fn deliver<S, H>(
    store: &S,
    query: &Query,
    handler: &H,
    last: &mut Option<Vec<Document>>,
) where
    S: DocumentStore,
    H: SnapshotHandler,
{
    match store.query(query).await {
        Ok(documents) => {
            // Versions restart after a delete, so compare whole documents.
            if last.as_ref() == Some(&documents) {
                return;
            }
            *last = Some(documents.clone());
            let snapshot = QuerySnapshot {
                documents,
                read_at: Utc::now(),
            };
            metrics::counter!("listener_snapshots_delivered").increment(1);
            handler.on_snapshot(snapshot).await;
        }
        Err(e) => handler.on_error(e).await,
    }
}
