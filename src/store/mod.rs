//! Persistence of the single application document.
//!
//! The store holds at most one exported document under a fixed key. It is
//! written only while the user has opted in to persistence and cleared
//! otherwise; loading falls back to the default state when nothing usable is
//! stored.

use crate::domain::AppState;
use crate::schema::{export_document, parse_document};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod debounce;
pub mod memory;
pub mod sqlite;

pub use debounce::DebouncedSaver;
pub use memory::MemoryDocumentStore;
pub use sqlite::SqliteDocumentStore;

/// Key-less view of the one stored document.
#[async_trait]
pub trait DocumentStore: Send + Sync + fmt::Debug {
    /// The stored document text, if any.
    async fn load(&self) -> Result<Option<String>, StoreError>;

    /// Replace the stored document text.
    async fn save(&self, body: String) -> Result<(), StoreError>;

    /// Remove the stored document.
    async fn clear(&self) -> Result<(), StoreError>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("could not serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// What [`sync_state`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Saved,
    Cleared,
}

/// Load the persisted state, or the default when absent or invalid.
pub async fn load_state_or_default(store: &dyn DocumentStore) -> AppState {
    let body = match store.load().await {
        Ok(Some(body)) => body,
        Ok(None) => {
            tracing::debug!("no persisted document; starting from default state");
            return AppState::default();
        }
        Err(err) => {
            tracing::warn!(error = %err, "could not read persisted document");
            return AppState::default();
        }
    };

    match parse_document(body.as_str()) {
        Ok(document) => {
            tracing::info!("restored persisted document");
            document.state
        }
        Err(err) => {
            tracing::warn!(
                issues = ?err.messages(),
                "persisted document rejected; starting from default state"
            );
            AppState::default()
        }
    }
}

/// Write the exported state when persistence is enabled, clear it otherwise.
///
/// # Errors
/// Store or serialization failures.
pub async fn sync_state(
    store: &dyn DocumentStore,
    state: &AppState,
) -> Result<SyncOutcome, StoreError> {
    if state.settings.persistence_opt_in {
        store.save(export_document(state)?).await?;
        Ok(SyncOutcome::Saved)
    } else {
        store.clear().await?;
        Ok(SyncOutcome::Cleared)
    }
}
