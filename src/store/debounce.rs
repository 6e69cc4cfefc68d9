//! Coalescing of rapid state changes into one write per quiet window.

use super::{sync_state, DocumentStore};
use crate::domain::AppState;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Background writer that syncs only the latest state once `window` passes
/// without a newer one.
#[derive(Debug)]
pub struct DebouncedSaver {
    tx: mpsc::UnboundedSender<AppState>,
    handle: JoinHandle<()>,
}

impl DebouncedSaver {
    /// Spawn the writer task on the current runtime.
    pub fn spawn(store: Arc<dyn DocumentStore>, window: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(store, window, rx));
        Self { tx, handle }
    }

    /// Queue `state` for the next write, replacing anything still pending.
    pub fn schedule(&self, state: AppState) {
        if self.tx.send(state).is_err() {
            tracing::warn!("debounced saver stopped; state change not persisted");
        }
    }

    /// Flush whatever is pending and stop the writer.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(err) = self.handle.await {
            tracing::error!(error = %err, "debounced saver task failed");
        }
    }
}

async fn persist(store: &dyn DocumentStore, state: &AppState) {
    match sync_state(store, state).await {
        Ok(outcome) => tracing::debug!(?outcome, "persistence synced"),
        Err(err) => tracing::error!(error = %err, "persistence sync failed"),
    }
}

async fn run(
    store: Arc<dyn DocumentStore>,
    window: Duration,
    mut rx: mpsc::UnboundedReceiver<AppState>,
) {
    while let Some(mut latest) = rx.recv().await {
        loop {
            tokio::select! {
                next = rx.recv() => match next {
                    Some(state) => latest = state,
                    None => {
                        persist(store.as_ref(), &latest).await;
                        return;
                    }
                },
                _ = tokio::time::sleep(window) => break,
            }
        }
        persist(store.as_ref(), &latest).await;
    }
}
