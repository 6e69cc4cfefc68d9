//! In-process document store.

use super::{DocumentStore, StoreError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Document store kept in memory; clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    body: Arc<Mutex<Option<String>>>,
    saves: Arc<AtomicUsize>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `body`.
    pub fn with_body(body: &str) -> Self {
        Self {
            body: Arc::new(Mutex::new(Some(body.to_string()))),
            saves: Arc::default(),
        }
    }

    /// Number of successful `save` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.body.lock().await.clone())
    }

    async fn save(&self, body: String) -> Result<(), StoreError> {
        *self.body.lock().await = Some(body);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.body.lock().await = None;
        Ok(())
    }
}
