pub mod document;
pub mod health;
pub mod scenarios;
pub mod state;
pub mod summary;
pub mod waterfall;

use crate::config::Config;
use crate::domain::AppState;
use crate::error::AppError;
use crate::scenarios::ScenarioLibrary;
use crate::store::{load_state_or_default, DebouncedSaver, DocumentStore};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

/// Shared handles every handler works against.
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub store: Arc<dyn DocumentStore>,
    pub scenarios: Arc<ScenarioLibrary>,
    current: Arc<RwLock<AppState>>,
    saver: Arc<DebouncedSaver>,
}

impl ServerState {
    /// Restore the persisted state (or the configured seed scenario when
    /// nothing is stored) and start the debounced writer.
    ///
    /// # Errors
    /// `Config` when the seed scenario is unknown or the library is invalid.
    pub async fn bootstrap(config: Config, store: Arc<dyn DocumentStore>) -> Result<Self, AppError> {
        let scenarios =
            ScenarioLibrary::load().map_err(|err| AppError::Config(err.to_string()))?;

        let has_document = store.load().await?.is_some();
        let initial = match config.seed_scenario.as_deref() {
            Some(id) if !has_document => {
                let scenario = scenarios
                    .get(id)
                    .ok_or_else(|| AppError::Config(format!("unknown SEED_SCENARIO: {id}")))?;
                tracing::info!(scenario = id, "seeding state from scenario");
                scenario.state.clone()
            }
            _ => load_state_or_default(store.as_ref()).await,
        };

        let saver = DebouncedSaver::spawn(store.clone(), config.save_debounce);
        Ok(Self {
            config,
            store,
            scenarios: Arc::new(scenarios),
            current: Arc::new(RwLock::new(initial)),
            saver: Arc::new(saver),
        })
    }

    pub async fn snapshot(&self) -> AppState {
        self.current.read().await.clone()
    }

    /// Swap in a new state and schedule its persistence sync.
    pub async fn replace(&self, state: AppState) -> AppState {
        self.update(|_| state).await
    }

    /// Derive the next state from the current one under the write lock.
    /// The sync is queued before the lock is released, so writes reach the
    /// store in the order they were applied.
    pub async fn update<F>(&self, next: F) -> AppState
    where
        F: FnOnce(&AppState) -> AppState,
    {
        let mut current = self.current.write().await;
        let state = next(&*current).normalized();
        *current = state.clone();
        self.saver.schedule(state.clone());
        state
    }

    /// Flush pending writes once no other handle to the saver remains.
    pub async fn shutdown(self) {
        match Arc::try_unwrap(self.saver) {
            Ok(saver) => saver.shutdown().await,
            Err(_) => tracing::warn!("saver still shared at shutdown; pending write may be lost"),
        }
    }
}

pub fn create_router(server: ServerState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route(
            "/v1/state",
            get(state::get_state)
                .put(state::put_state)
                .delete(state::reset_state),
        )
        .route("/v1/state/apply-rounds", post(state::apply_rounds))
        .route(
            "/v1/document",
            get(document::export).post(document::import),
        )
        .route("/v1/summary", get(summary::get_summary))
        .route("/v1/waterfall", post(waterfall::post_waterfall))
        .route("/v1/scenarios", get(scenarios::list_scenarios))
        .route("/v1/scenarios/:id/load", post(scenarios::load_scenario))
        .layer(cors)
        .with_state(server)
}
