use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgListener, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::store::{CHANGE_FEED_CAPACITY, apply_write, validate_batch};
use crate::{
    ChangeNotice, CollectionPath, CommitResult, Direction, Document, DocumentPath, DocumentStore,
    DocumentStoreError, Fields, Precondition, Query, Result, Version, WriteBatch,
};

/// Channel used to relay change notices between processes.
const NOTIFY_CHANNEL: &str = "document_changes";

/// PostgreSQL-backed document store.
///
/// Documents live in a single `documents` table with JSONB data. Each batch
/// runs in one transaction and locks the rows it touches with
/// `SELECT ... FOR UPDATE`, so concurrent batches on the same document
/// serialize instead of overwriting each other.
#[derive(Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
    changes: broadcast::Sender<ChangeNotice>,
}

impl PostgresDocumentStore {
    /// Creates a new PostgreSQL document store.
    pub fn new(pool: PgPool) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self { pool, changes }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    /// Relays change notices committed by other processes into this
    /// store's change feed.
    ///
    /// Local commits are already published directly; with the relay running
    /// they arrive twice, which listeners tolerate because they only emit
    /// snapshots that differ from the previous one.
    pub async fn spawn_change_relay(&self) -> Result<JoinHandle<()>> {
        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(NOTIFY_CHANNEL).await?;
        let changes = self.changes.clone();

        Ok(tokio::spawn(async move {
            loop {
                match listener.recv().await {
                    Ok(notification) => {
                        match serde_json::from_str::<ChangeNotice>(notification.payload()) {
                            Ok(notice) => {
                                let _ = changes.send(notice);
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "ignoring malformed change notice");
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "change relay stopped");
                        break;
                    }
                }
            }
        }))
    }

    fn row_to_document(row: PgRow) -> Result<Document> {
        let collection: String = row.try_get("collection")?;
        let id: String = row.try_get("id")?;
        let data = match row.try_get::<Value, _>("data")? {
            Value::Object(fields) => fields,
            _ => Fields::new(),
        };

        Ok(Document {
            path: DocumentPath::new(CollectionPath::new(collection), id),
            data,
            version: Version::new(row.try_get("version")?),
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
        })
    }

    async fn load_for_update(
        tx: &mut Transaction<'_, Postgres>,
        path: &DocumentPath,
    ) -> Result<Option<Document>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT collection, id, data, version, updated_at
            FROM documents
            WHERE collection = $1 AND id = $2
            FOR UPDATE
            "#,
        )
        .bind(path.collection.as_str())
        .bind(&path.id)
        .fetch_optional(&mut **tx)
        .await?;

        row.map(Self::row_to_document).transpose()
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT collection, id, data, version, updated_at
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(path.collection.as_str())
        .bind(&path.id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_document).transpose()
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>> {
        let mut sql = String::from(
            "SELECT collection, id, data, version, updated_at FROM documents WHERE collection = $1",
        );
        let mut param_count = 1;

        // Build dynamic query
        for _ in &query.filters {
            sql.push_str(&format!(
                " AND data -> ${} = ${}",
                param_count + 1,
                param_count + 2
            ));
            param_count += 2;
        }

        if let Some(order) = &query.order_by {
            param_count += 1;
            let direction = match order.direction {
                Direction::Ascending => "ASC NULLS FIRST",
                Direction::Descending => "DESC NULLS LAST",
            };
            sql.push_str(&format!(" ORDER BY data -> ${param_count} {direction}, id ASC"));
        } else {
            sql.push_str(" ORDER BY id ASC");
        }

        if query.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }

        // Build and execute query with parameters
        let mut sqlx_query = sqlx::query(&sql).bind(query.collection.as_str());

        for filter in &query.filters {
            sqlx_query = sqlx_query.bind(&filter.field).bind(&filter.value);
        }
        if let Some(order) = &query.order_by {
            sqlx_query = sqlx_query.bind(&order.field);
        }
        if let Some(limit) = query.limit {
            sqlx_query = sqlx_query.bind(limit as i64);
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_document).collect()
    }

    async fn commit(&self, batch: WriteBatch) -> Result<CommitResult> {
        validate_batch(&batch)?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let mut staged: HashMap<DocumentPath, Option<Document>> = HashMap::new();
        let mut order: Vec<DocumentPath> = Vec::new();
        let mut written = Vec::with_capacity(batch.len());
        // Paths with no row to lock whose precondition relied on that absence.
        let mut guarded_creates: HashMap<DocumentPath, Precondition> = HashMap::new();

        for write in batch.writes() {
            let path = write.op.path().clone();
            let current = match staged.get(&path) {
                Some(state) => state.clone(),
                None => {
                    order.push(path.clone());
                    let loaded = Self::load_for_update(&mut tx, &path).await?;
                    if let (None, Some(precondition)) = (&loaded, write.precondition) {
                        guarded_creates.insert(path.clone(), precondition);
                    }
                    loaded
                }
            };

            // Dropping `tx` on error rolls the transaction back.
            let next = apply_write(current, write, now)?;
            written.push((path.clone(), next.as_ref().map(|d| d.version).unwrap_or_default()));
            staged.insert(path, next);
        }

        for path in &order {
            match staged.get(path) {
                Some(Some(doc)) if guarded_creates.contains_key(path) => {
                    let inserted = sqlx::query(
                        r#"
                        INSERT INTO documents (collection, id, data, version, updated_at)
                        VALUES ($1, $2, $3, $4, $5)
                        ON CONFLICT (collection, id) DO NOTHING
                        "#,
                    )
                    .bind(path.collection.as_str())
                    .bind(&path.id)
                    .bind(Value::Object(doc.data.clone()))
                    .bind(doc.version.as_i64())
                    .bind(doc.updated_at)
                    .execute(&mut *tx)
                    .await?;

                    if inserted.rows_affected() == 0 {
                        let actual = Self::load_for_update(&mut tx, path)
                            .await?
                            .map(|d| d.version)
                            .unwrap_or_default();
                        return Err(lost_create_race(path, guarded_creates[path], actual));
                    }
                }
                Some(Some(doc)) => {
                    sqlx::query(
                        r#"
                        INSERT INTO documents (collection, id, data, version, updated_at)
                        VALUES ($1, $2, $3, $4, $5)
                        ON CONFLICT (collection, id) DO UPDATE SET
                            data = EXCLUDED.data,
                            version = EXCLUDED.version,
                            updated_at = EXCLUDED.updated_at
                        "#,
                    )
                    .bind(path.collection.as_str())
                    .bind(&path.id)
                    .bind(Value::Object(doc.data.clone()))
                    .bind(doc.version.as_i64())
                    .bind(doc.updated_at)
                    .execute(&mut *tx)
                    .await?;
                }
                Some(None) => {
                    sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
                        .bind(path.collection.as_str())
                        .bind(&path.id)
                        .execute(&mut *tx)
                        .await?;
                }
                None => {}
            }

            let notice = ChangeNotice {
                collection: path.collection.clone(),
                id: path.id.clone(),
            };
            sqlx::query("SELECT pg_notify($1, $2)")
                .bind(NOTIFY_CHANNEL)
                .bind(serde_json::to_string(&notice)?)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await.map_err(DocumentStoreError::Database)?;

        metrics::counter!("document_store_commits").increment(1);
        tracing::debug!(writes = written.len(), "batch committed");

        for path in order {
            let _ = self.changes.send(ChangeNotice {
                collection: path.collection,
                id: path.id,
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

/// Error for a guarded create whose row was inserted by another transaction
/// after this one found it missing.
fn lost_create_race(
    path: &DocumentPath,
    precondition: Precondition,
    actual: Version,
) -> DocumentStoreError {
    match precondition {
        Precondition::Version(expected) => DocumentStoreError::ConcurrencyConflict {
            path: path.clone(),
            expected,
            actual,
        },
        Precondition::Exists(_) => DocumentStoreError::PreconditionFailed {
            path: path.clone(),
            reason: "document already exists".to_string(),
        },
    }
}
