use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::api::ServerState;
use crate::domain::AppState;
use crate::error::AppError;
use crate::orchestration::apply_financing_rounds;
use crate::schema::parse_app_state;

pub async fn get_state(State(server): State<ServerState>) -> Json<AppState> {
    Json(server.snapshot().await)
}

/// Replace the whole state; the body must be a valid current-version state.
pub async fn put_state(
    State(server): State<ServerState>,
    Json(body): Json<Value>,
) -> Result<Json<AppState>, AppError> {
    let next = parse_app_state(&body).map_err(|err| {
        tracing::warn!(issues = err.messages().len(), "state replacement rejected");
        AppError::from(err)
    })?;
    Ok(Json(server.replace(next).await))
}

pub async fn reset_state(State(server): State<ServerState>) -> Json<AppState> {
    Json(server.replace(AppState::default()).await)
}

pub async fn apply_rounds(State(server): State<ServerState>) -> Json<AppState> {
    Json(server.update(apply_financing_rounds).await)
}
