use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;

use crate::api::ServerState;
use crate::domain::AppState;
use crate::error::AppError;
use crate::schema::{export_document, parse_document};

/// The current state as a downloadable `{schemaVersion, state}` document.
pub async fn export(State(server): State<ServerState>) -> Result<impl IntoResponse, AppError> {
    let body = export_document(&server.snapshot().await)?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"equity-console.json\"",
            ),
        ],
        body,
    ))
}

/// Import a document from its raw text; legacy documents are upgraded.
pub async fn import(
    State(server): State<ServerState>,
    body: String,
) -> Result<Json<AppState>, AppError> {
    let document = parse_document(body.as_str()).map_err(|err| {
        tracing::warn!(issues = err.messages().len(), "document import rejected");
        AppError::from(err)
    })?;
    Ok(Json(server.replace(document.state).await))
}
