use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::api::ServerState;

pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Ready once the document store answers.
pub async fn ready(State(server): State<ServerState>) -> (StatusCode, Json<Value>) {
    match server.store.load().await {
        Ok(stored) => (
            StatusCode::OK,
            Json(json!({"status": "ready", "persisted": stored.is_some()})),
        ),
        Err(err) => {
            tracing::warn!(error = %err, "document store not reachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "unavailable"})),
            )
        }
    }
}
