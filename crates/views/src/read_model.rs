//! Read model trait for live views.

use async_trait::async_trait;
use document_store::QuerySnapshot;

use crate::Result;

/// Client-side state rebuilt from query snapshots.
///
/// Every snapshot carries the full query result, so `apply` replaces the
/// state rather than patching it.
#[async_trait]
pub trait ReadModel: Send + Sync + 'static {
    /// Returns the name of this read model.
    fn name(&self) -> &'static str;

    /// Replaces the state with the contents of a snapshot.
    async fn apply(&self, snapshot: &QuerySnapshot) -> Result<()>;

    /// Clears all state.
    async fn reset(&self);

    /// Returns the number of entries in this read model.
    async fn count(&self) -> usize;
}
