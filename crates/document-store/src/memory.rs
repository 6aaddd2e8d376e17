use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{RwLock, broadcast};

use crate::store::{CHANGE_FEED_CAPACITY, apply_write, validate_batch};
use crate::{
    ChangeNotice, CollectionPath, CommitResult, Document, DocumentPath, DocumentStore, Query,
    Result, WriteBatch,
};

type Collections = HashMap<CollectionPath, BTreeMap<String, Document>>;

/// In-memory document store.
///
/// Provides the same interface and batch semantics as the PostgreSQL
/// implementation. A whole batch is applied under a single write lock.
#[derive(Clone)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<Collections>>,
    changes: broadcast::Sender<ChangeNotice>,
}

impl InMemoryDocumentStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
            changes,
        }
    }

    /// Returns the number of documents in a collection.
    pub async fn document_count(&self, collection: &CollectionPath) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    /// Clears every collection.
    pub async fn clear(&self) {
        self.collections.write().await.clear();
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&path.collection)
            .and_then(|docs| docs.get(&path.id))
            .cloned())
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        let mut documents: Vec<Document> = collections
            .get(&query.collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| query.matches(doc))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        query.sort_and_limit(&mut documents);
        Ok(documents)
    }

    async fn commit(&self, batch: WriteBatch) -> Result<CommitResult> {
        validate_batch(&batch)?;

        let now = Utc::now();
        let mut collections = self.collections.write().await;

        // Stage every write first so a failure leaves the store untouched.
        let mut staged: HashMap<DocumentPath, Option<Document>> = HashMap::new();
        let mut written = Vec::with_capacity(batch.len());

        for write in batch.writes() {
            let path = write.op.path().clone();
            let current = match staged.get(&path) {
                Some(state) => state.clone(),
                None => collections
                    .get(&path.collection)
                    .and_then(|docs| docs.get(&path.id))
                    .cloned(),
            };

            let next = apply_write(current, write, now)?;
            written.push((path.clone(), next.as_ref().map(|d| d.version).unwrap_or_default()));
            staged.insert(path, next);
        }

        for (path, state) in staged {
            let docs = collections.entry(path.collection.clone()).or_default();
            match state {
                Some(doc) => {
                    docs.insert(path.id, doc);
                }
                None => {
                    docs.remove(&path.id);
                }
            }
        }
        drop(collections);

        metrics::counter!("document_store_commits").increment(1);
        tracing::debug!(writes = written.len(), "batch committed");

        for (path, _) in &written {
            // No receivers is fine: nobody is listening yet.
            let _ = self.changes.send(ChangeNotice {
                collection: path.collection.clone(),
                id: path.id.clone(),
            });
        }

        Ok(CommitResult {
            written,
            committed_at: now,
        })
    }

    fn changes(&self) -> broadcast::Receiver<ChangeNotice> {
        self.changes.subscribe()
    }
}
