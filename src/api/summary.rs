use axum::extract::State;
use axum::Json;

use crate::api::ServerState;
use crate::orchestration::{compute_dashboard_summary, DashboardSummary};

pub async fn get_summary(State(server): State<ServerState>) -> Json<DashboardSummary> {
    Json(compute_dashboard_summary(&server.snapshot().await))
}
