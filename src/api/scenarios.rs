use axum::extract::{Path, State};
use axum::Json;

use crate::api::ServerState;
use crate::domain::AppState;
use crate::error::AppError;
use crate::scenarios::Scenario;

pub async fn list_scenarios(State(server): State<ServerState>) -> Json<Vec<Scenario>> {
    Json(server.scenarios.list().to_vec())
}

/// Replace the current state with a built-in scenario.
pub async fn load_scenario(
    State(server): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<AppState>, AppError> {
    let scenario = server
        .scenarios
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("scenario {id}")))?;
    tracing::info!(scenario = %id, "loading scenario");
    Ok(Json(server.replace(scenario.state.clone()).await))
}
