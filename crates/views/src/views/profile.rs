use async_trait::async_trait;
use common::UserId;
use document_store::{Query, QuerySnapshot};
use domain::{UserProfile, collections};
use tokio::sync::RwLock;

use crate::read_model::ReadModel;
use crate::{Result, ViewError};

/// Read model view of the signed-in user's own profile.
#[derive(Default)]
pub struct ProfileView {
    profile: RwLock<Option<UserProfile>>,
}

impl ProfileView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(user_id: &UserId) -> Query {
        Query::collection(collections::USERS).where_eq("uid", user_id.as_str())
    }

    pub async fn profile(&self) -> Option<UserProfile> {
        self.profile.read().await.clone()
    }
}

#[async_trait]
impl ReadModel for ProfileView {
    fn name(&self) -> &'static str {
        "ProfileView"
    }

    async fn apply(&self, snapshot: &QuerySnapshot) -> Result<()> {
        let mut profiles: Vec<UserProfile> = snapshot.to_objects()?;
        if profiles.len() > 1 {
            return Err(ViewError::View(format!(
                "expected one profile, found {}",
                profiles.len()
            )));
        }
        *self.profile.write().await = profiles.pop();
        Ok(())
    }

    async fn reset(&self) {
        *self.profile.write().await = None;
    }

    async fn count(&self) -> usize {
        usize::from(self.profile.read().await.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use document_store::{DocumentPath, DocumentStore, DocumentStoreExt, InMemoryDocumentStore};
    use serde_json::json;

    async fn snapshot(store: &InMemoryDocumentStore, uid: &str) -> QuerySnapshot {
        QuerySnapshot {
            documents: store.query(&ProfileView::query(&UserId::new(uid))).await.unwrap(),
            read_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_apply_sets_and_clears_profile() {
        let store = InMemoryDocumentStore::new();
        let view = ProfileView::new();
        store
            .set(
                DocumentPath::new(collections::USERS, "u-1"),
                &json!({"uid": "u-1", "name": "Sari", "email": "sari@example.com", "role": "Petani"}),
            )
            .await
            .unwrap();

        view.apply(&snapshot(&store, "u-1").await).await.unwrap();
        let profile = view.profile().await.unwrap();
        assert_eq!(profile.name, "Sari");
        assert_eq!(profile.role, domain::Role::Petani);

        view.apply(&snapshot(&store, "u-2").await).await.unwrap();
        assert!(view.profile().await.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_profiles_are_rejected() {
        let store = InMemoryDocumentStore::new();
        let view = ProfileView::new();
        for id in ["a", "b"] {
            store
                .set(
                    DocumentPath::new(collections::USERS, id),
                    &json!({"uid": "u-1", "name": id, "email": "x@example.com"}),
                )
                .await
                .unwrap();
        }

        let result = view.apply(&snapshot(&store, "u-1").await).await;
        assert!(matches!(result, Err(ViewError::View(_))));
        assert_eq!(view.count().await, 0);
    }
}
