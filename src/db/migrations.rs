//! SQLite connection setup and schema application.

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

const SCHEMA_SQL: &str = include_str!("schema.sql");

fn ensure_parent_dir(db_path: &str) {
    let Some(parent) = Path::new(db_path).parent() else {
        return;
    };
    if parent.as_os_str().is_empty() {
        return;
    }
    if let Err(err) = std::fs::create_dir_all(parent) {
        warn!(error = %err, path = %parent.display(), "could not create database directory");
    }
}

/// WAL journal, 5s busy timeout, NORMAL fsync; the file is created if absent.
fn connect_options(db_path: &str) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5))
}

/// Open (creating if needed) the SQLite file at `db_path` and apply the schema.
///
/// # Errors
/// Connection or schema statement failures.
pub async fn init_db(db_path: &str) -> Result<SqlitePool, sqlx::Error> {
    ensure_parent_dir(db_path);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options(db_path))
        .await?;

    apply_schema(&pool).await?;

    info!(path = db_path, "database initialized");
    Ok(pool)
}

/// Every statement is `IF NOT EXISTS`, so reapplying is harmless.
async fn apply_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut applied = 0usize;
    for statement in SCHEMA_SQL.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement).execute(&mut *tx).await?;
        applied += 1;
    }
    tx.commit().await?;
    tracing::debug!(statements = applied, "document store schema applied");
    Ok(())
}
