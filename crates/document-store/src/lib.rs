//! Document store for the marketplace backend.
//!
//! Documents are JSON objects grouped into collections (`products`,
//! `users/<uid>/cart`, ...). The store supports filtered queries, atomic
//! multi-document write batches with preconditions, and real-time snapshot
//! listeners fed from a shared change feed.

pub mod batch;
pub mod document;
pub mod error;
pub mod listener;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;

pub use batch::{BatchWrite, Precondition, WriteBatch, WriteOp};
pub use document::{CollectionPath, Document, DocumentPath, Fields, Version, to_fields};
pub use error::{DocumentStoreError, Result};
pub use listener::{
    Listener, ListenerRegistration, QuerySnapshot, SnapshotHandler, SnapshotStream,
    add_snapshot_listener, listen,
};
pub use memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;
pub use query::{Direction, Filter, OrderBy, Query};
pub use store::{ChangeNotice, CommitResult, DocumentStore, DocumentStoreExt};
