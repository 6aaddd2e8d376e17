use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::document::json_kind;
use crate::{
    BatchWrite, CollectionPath, Document, DocumentPath, DocumentStoreError, Fields, Precondition,
    Query, Result, Version, WriteBatch, WriteOp, to_fields,
};

/// Capacity of the in-process change feed.
pub(crate) const CHANGE_FEED_CAPACITY: usize = 1024;

/// Notice published on the change feed after a committed write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeNotice {
    pub collection: CollectionPath,
    pub id: String,
}

/// Outcome of a committed write batch.
#[derive(Debug, Clone)]
pub struct CommitResult {
    /// Every written document with its version after the commit.
    /// Deleted documents report `Version::initial()`.
    pub written: Vec<(DocumentPath, Version)>,

    /// Commit timestamp, shared by every write in the batch.
    pub committed_at: DateTime<Utc>,
}

impl CommitResult {
    /// Returns the version a path ended at, if the batch wrote it.
    pub fn version_of(&self, path: &DocumentPath) -> Option<Version> {
        self.written
            .iter()
            .rev()
            .find(|(p, _)| p == path)
            .map(|(_, v)| *v)
    }
}

/// Core trait for document store implementations.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads a single document.
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>>;

    /// Runs a query against one collection.
    async fn query(&self, query: &Query) -> Result<Vec<Document>>;

    /// Commits a write batch atomically.
    ///
    /// Either every write applies or none does. On success a
    /// [`ChangeNotice`] is published for each written document.
    async fn commit(&self, batch: WriteBatch) -> Result<CommitResult>;

    /// Subscribes to the change feed.
    fn changes(&self) -> broadcast::Receiver<ChangeNotice>;
}

/// Extension trait providing single-document convenience methods.
#[async_trait]
pub trait DocumentStoreExt: DocumentStore {
    /// Creates or replaces a document from a serializable record.
    async fn set<T: Serialize + Sync + ?Sized>(
        &self,
        path: DocumentPath,
        value: &T,
    ) -> Result<Version> {
        let batch = WriteBatch::new().set(path.clone(), value)?;
        let result = self.commit(batch).await?;
        Ok(result.version_of(&path).unwrap_or_default())
    }

    /// Merges fields into an existing document.
    async fn update(&self, path: DocumentPath, fields: Fields) -> Result<Version> {
        let result = self
            .commit(WriteBatch::new().update(path.clone(), fields))
            .await?;
        Ok(result.version_of(&path).unwrap_or_default())
    }

    /// Merges the fields of a serializable value into an existing document.
    async fn update_with<T: Serialize + Sync + ?Sized>(
        &self,
        path: DocumentPath,
        value: &T,
    ) -> Result<Version> {
        let fields = to_fields(value)?;
        self.update(path, fields).await
    }

    /// Deletes a document. Missing documents are ignored.
    async fn delete(&self, path: DocumentPath) -> Result<()> {
        self.commit(WriteBatch::new().delete(path)).await?;
        Ok(())
    }

    /// Checks whether a document exists.
    async fn exists(&self, path: &DocumentPath) -> Result<bool> {
        Ok(self.get(path).await?.is_some())
    }

    /// Reads a document and deserializes it.
    async fn get_as<T: DeserializeOwned + Send>(&self, path: &DocumentPath) -> Result<Option<T>> {
        match self.get(path).await? {
            Some(doc) => Ok(Some(doc.deserialize()?)),
            None => Ok(None),
        }
    }

    /// Runs a query and deserializes every result.
    async fn query_as<T: DeserializeOwned + Send>(&self, query: &Query) -> Result<Vec<T>> {
        self.query(query)
            .await?
            .iter()
            .map(Document::deserialize)
            .collect()
    }

    /// Generates a fresh document id.
    fn generate_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

// Blanket implementation for all DocumentStore implementations
impl<T: DocumentStore + ?Sized> DocumentStoreExt for T {}

/// Validates a batch before any write is attempted.
pub(crate) fn validate_batch(batch: &WriteBatch) -> Result<()> {
    if batch.is_empty() {
        return Err(DocumentStoreError::EmptyBatch);
    }

    for write in batch.writes() {
        let path = write.op.path();
        if path.id.is_empty() || path.id.contains('/') {
            return Err(DocumentStoreError::InvalidDocument(format!(
                "invalid document id '{}' in {}",
                path.id, path.collection
            )));
        }
        match &write.op {
            WriteOp::Update { fields, .. } => {
                for name in fields.keys() {
                    validate_field_name(name)?;
                }
            }
            WriteOp::Increment { field, .. } => validate_field_name(field)?,
            WriteOp::Set { .. } | WriteOp::Delete { .. } => {}
        }
    }

    Ok(())
}

fn validate_field_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DocumentStoreError::InvalidField {
            field: name.to_string(),
            reason: "field name must not be empty".to_string(),
        });
    }
    Ok(())
}

fn check_precondition(
    current: Option<&Document>,
    path: &DocumentPath,
    precondition: Option<Precondition>,
) -> Result<()> {
    match precondition {
        None => Ok(()),
        Some(Precondition::Exists(expected)) => {
            if current.is_some() == expected {
                Ok(())
            } else if expected {
                Err(DocumentStoreError::PreconditionFailed {
                    path: path.clone(),
                    reason: "document does not exist".to_string(),
                })
            } else {
                Err(DocumentStoreError::PreconditionFailed {
                    path: path.clone(),
                    reason: "document already exists".to_string(),
                })
            }
        }
        Some(Precondition::Version(expected)) => {
            let actual = current.map(|d| d.version).unwrap_or_default();
            if actual == expected {
                Ok(())
            } else {
                Err(DocumentStoreError::ConcurrencyConflict {
                    path: path.clone(),
                    expected,
                    actual,
                })
            }
        }
    }
}

/// Applies one write to the current state of its document.
///
/// Returns the new state, `None` meaning the document is deleted. Shared by
/// every store implementation so batch semantics stay identical.
pub(crate) fn apply_write(
    current: Option<Document>,
    write: &BatchWrite,
    now: DateTime<Utc>,
) -> Result<Option<Document>> {
    let path = write.op.path();
    check_precondition(current.as_ref(), path, write.precondition)?;

    match &write.op {
        WriteOp::Set { data, .. } => {
            let version = current.map(|d| d.version).unwrap_or_default().next();
            Ok(Some(Document {
                path: path.clone(),
                data: data.clone(),
                version,
                updated_at: now,
            }))
        }
        WriteOp::Update { fields, .. } => {
            let mut doc = current.ok_or_else(|| DocumentStoreError::NotFound(path.clone()))?;
            for (name, value) in fields {
                doc.data.insert(name.clone(), value.clone());
            }
            doc.version = doc.version.next();
            doc.updated_at = now;
            Ok(Some(doc))
        }
        WriteOp::Increment {
            field,
            delta,
            floor,
            ..
        } => {
            let mut doc = current.ok_or_else(|| DocumentStoreError::NotFound(path.clone()))?;
            let value = match doc.data.get(field) {
                None | Some(Value::Null) => 0,
                Some(Value::Number(n)) => n.as_i64().ok_or_else(|| DocumentStoreError::InvalidField {
                    field: field.clone(),
                    reason: format!("{n} is not an integer"),
                })?,
                Some(other) => {
                    return Err(DocumentStoreError::InvalidField {
                        field: field.clone(),
                        reason: format!("cannot increment a {}", json_kind(other)),
                    });
                }
            };
            let next = value
                .checked_add(*delta)
                .ok_or_else(|| DocumentStoreError::InvalidField {
                    field: field.clone(),
                    reason: "increment overflows".to_string(),
                })?;
            if let Some(floor) = floor
                && next < *floor
            {
                return Err(DocumentStoreError::FloorViolation {
                    path: path.clone(),
                    field: field.clone(),
                    current: value,
                    delta: *delta,
                    floor: *floor,
                });
            }
            doc.data.insert(field.clone(), Value::from(next));
            doc.version = doc.version.next();
            doc.updated_at = now;
            Ok(Some(doc))
        }
        WriteOp::Delete { .. } => Ok(None),
    }
}
