//! Repository layer for database operations.

use sqlx::sqlite::SqlitePool;
use sqlx::Row;

/// A stored document body with its last write time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub body: String,
    pub updated_at_ms: i64,
}

/// Repository for database operations.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Upsert the document body stored under `key`.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub async fn upsert_document(&self, key: &str, body: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO app_documents (key, body, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(body)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch the document stored under `key`, if any.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_document(&self, key: &str) -> Result<Option<StoredDocument>, sqlx::Error> {
        let row = sqlx::query("SELECT body, updated_at FROM app_documents WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| StoredDocument {
            body: r.get("body"),
            updated_at_ms: r.get("updated_at"),
        }))
    }

    /// Remove the document under `key`. Returns whether a row was deleted.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub async fn delete_document(&self, key: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM app_documents WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::init_db;
    use tempfile::TempDir;

    async fn setup_test_db() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (Repository::new(pool), temp_dir)
    }

    #[tokio::test]
    async fn test_upsert_and_get_document() {
        let (repo, _temp) = setup_test_db().await;

        assert_eq!(repo.get_document("k").await.unwrap(), None);

        repo.upsert_document("k", "first").await.unwrap();
        repo.upsert_document("k", "second").await.unwrap();

        let stored = repo.get_document("k").await.unwrap().unwrap();
        assert_eq!(stored.body, "second");
        assert!(stored.updated_at_ms > 0);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let (repo, _temp) = setup_test_db().await;

        repo.upsert_document("a", "one").await.unwrap();
        repo.upsert_document("b", "two").await.unwrap();

        assert_eq!(repo.get_document("a").await.unwrap().unwrap().body, "one");
        assert_eq!(repo.get_document("b").await.unwrap().unwrap().body, "two");
    }

    #[tokio::test]
    async fn test_delete_document() {
        let (repo, _temp) = setup_test_db().await;

        repo.upsert_document("k", "body").await.unwrap();
        assert!(repo.delete_document("k").await.unwrap());
        assert!(!repo.delete_document("k").await.unwrap());
        assert_eq!(repo.get_document("k").await.unwrap(), None);
    }
}
