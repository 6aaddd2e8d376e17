use serde::Serialize;

use crate::{DocumentPath, Fields, Result, Version, to_fields};

/// Condition a document must satisfy for a write to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// The document must exist (or must not exist when `false`).
    Exists(bool),

    /// The document must be at exactly this version.
    /// `Version::initial()` means the document must not exist.
    Version(Version),
}

/// A single write operation.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Creates the document or replaces all of its fields.
    Set { path: DocumentPath, data: Fields },

    /// Merges top-level fields into an existing document.
    Update { path: DocumentPath, fields: Fields },

    /// Adds `delta` to an integer field of an existing document.
    ///
    /// A missing field counts as 0. When `floor` is set, the write is
    /// rejected if the result would be below it.
    Increment {
        path: DocumentPath,
        field: String,
        delta: i64,
        floor: Option<i64>,
    },

    /// Deletes the document. Deleting a missing document is not an error.
    Delete { path: DocumentPath },
}

impl WriteOp {
    /// Returns the path this operation writes to.
    pub fn path(&self) -> &DocumentPath {
        match self {
            WriteOp::Set { path, .. }
            | WriteOp::Update { path, .. }
            | WriteOp::Increment { path, .. }
            | WriteOp::Delete { path } => path,
        }
    }

    /// Returns a short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            WriteOp::Set { .. } => "set",
            WriteOp::Update { .. } => "update",
            WriteOp::Increment { .. } => "increment",
            WriteOp::Delete { .. } => "delete",
        }
    }
}

/// A write operation with its optional precondition.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchWrite {
    pub op: WriteOp,
    pub precondition: Option<Precondition>,
}

/// An ordered group of writes committed atomically.
///
/// Either every write applies or none does. Writes are applied in order, so
/// a later write in the batch sees the effect of earlier writes to the same
/// document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    writes: Vec<BatchWrite>,
}

impl WriteBatch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a write with an optional precondition.
    pub fn push(mut self, op: WriteOp, precondition: Option<Precondition>) -> Self {
        self.writes.push(BatchWrite { op, precondition });
        self
    }

    /// Creates or replaces a document with raw fields.
    pub fn set_fields(self, path: DocumentPath, data: Fields) -> Self {
        self.push(WriteOp::Set { path, data }, None)
    }

    /// Creates or replaces a document from a serializable record.
    pub fn set<T: Serialize + ?Sized>(self, path: DocumentPath, value: &T) -> Result<Self> {
        Ok(self.set_fields(path, to_fields(value)?))
    }

    /// Merges fields into an existing document.
    pub fn update(self, path: DocumentPath, fields: Fields) -> Self {
        self.push(WriteOp::Update { path, fields }, None)
    }

    /// Merges fields into an existing document at an expected version.
    pub fn update_at_version(self, path: DocumentPath, fields: Fields, version: Version) -> Self {
        self.push(
            WriteOp::Update { path, fields },
            Some(Precondition::Version(version)),
        )
    }

    /// Adds a signed delta to an integer field.
    pub fn increment(self, path: DocumentPath, field: impl Into<String>, delta: i64) -> Self {
        self.push(
            WriteOp::Increment {
                path,
                field: field.into(),
                delta,
                floor: None,
            },
            None,
        )
    }

    /// Adds a signed delta to an integer field, refusing to go below `floor`.
    pub fn increment_with_floor(
        self,
        path: DocumentPath,
        field: impl Into<String>,
        delta: i64,
        floor: i64,
    ) -> Self {
        self.push(
            WriteOp::Increment {
                path,
                field: field.into(),
                delta,
                floor: Some(floor),
            },
            None,
        )
    }

    /// Deletes a document.
    pub fn delete(self, path: DocumentPath) -> Self {
        self.push(WriteOp::Delete { path }, None)
    }

    /// Returns the writes in commit order.
    pub fn writes(&self) -> &[BatchWrite] {
        &self.writes
    }

    /// Consumes the batch, returning its writes.
    pub fn into_writes(self) -> Vec<BatchWrite> {
        self.writes
    }

    /// Returns the number of writes.
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Returns true if the batch has no writes.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_keeps_commit_order() {
        let product = DocumentPath::new("products", "p-1");
        let cart = DocumentPath::new("users/u-1/cart", "p-1");

        let batch = WriteBatch::new()
            .set(DocumentPath::new("orders", "o-1"), &json!({"total": 10}))
            .unwrap()
            .increment_with_floor(product.clone(), "stock", -2, 0)
            .delete(cart.clone());

        let kinds: Vec<_> = batch.writes().iter().map(|w| w.op.kind()).collect();
        assert_eq!(kinds, vec!["set", "increment", "delete"]);
        assert_eq!(batch.writes()[1].op.path(), &product);
        assert_eq!(batch.writes()[2].op.path(), &cart);
        assert_eq!(batch.len(), 3);
    }

    #[test]
    fn set_rejects_non_object_values() {
        let result = WriteBatch::new().set(DocumentPath::new("orders", "o-1"), &json!("nope"));
        assert!(result.is_err());
    }

    #[test]
    fn update_at_version_attaches_precondition() {
        let batch = WriteBatch::new().update_at_version(
            DocumentPath::new("orders", "o-1"),
            Fields::new(),
            Version::new(3),
        );
        assert_eq!(
            batch.writes()[0].precondition,
            Some(Precondition::Version(Version::new(3)))
        );
    }
}
