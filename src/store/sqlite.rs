//! SQLite-backed document store.

use super::{DocumentStore, StoreError};
use crate::db::Repository;
use async_trait::async_trait;

/// Persists the document in the `app_documents` table under a fixed key.
#[derive(Debug, Clone)]
pub struct SqliteDocumentStore {
    repo: Repository,
    key: String,
}

impl SqliteDocumentStore {
    pub fn new(repo: Repository, key: impl Into<String>) -> Self {
        Self {
            repo,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn load(&self) -> Result<Option<String>, StoreError> {
        let stored = self.repo.get_document(&self.key).await?;
        Ok(stored.map(|document| document.body))
    }

    async fn save(&self, body: String) -> Result<(), StoreError> {
        self.repo.upsert_document(&self.key, &body).await?;
        tracing::debug!(key = %self.key, bytes = body.len(), "document saved");
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        if self.repo.delete_document(&self.key).await? {
            tracing::debug!(key = %self.key, "document cleared");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use crate::domain::AppState;
    use crate::store::{load_state_or_default, sync_state};
    use tempfile::TempDir;

    async fn setup_store() -> (SqliteDocumentStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (SqliteDocumentStore::new(Repository::new(pool), "test-key"), temp_dir)
    }

    #[tokio::test]
    async fn test_persists_opted_in_state() {
        let (store, _temp) = setup_store().await;
        let mut state = AppState::default();
        state.settings.persistence_opt_in = true;

        sync_state(&store, &state).await.unwrap();
        assert!(store.load().await.unwrap().is_some());
        assert_eq!(load_state_or_default(&store).await, state);

        state.settings.persistence_opt_in = false;
        sync_state(&store, &state).await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }
}
