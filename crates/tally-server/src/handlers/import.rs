//! Import handler

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    Json,
};

use crate::{AppError, AppState, MAX_BODY_SIZE};
use tally_core::models::ImportSummary;

/// POST /api/import - Validate and store a batch of transactions
///
/// The body is parsed leniently (no content-type requirement) and handed to
/// the core import as raw JSON so validation errors come back with the exact
/// row-level messages.
pub async fn import_transactions(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<ImportSummary>, AppError> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    let payload: serde_json::Value = serde_json::from_slice(&bytes)
        .map_err(|_| AppError::bad_request("Request body must be valid JSON."))?;

    let summary = tally_core::import::import_transactions(&state.db, &payload)
        .map_err(super::map_core_error)?;

    Ok(Json(summary))
}

/// OPTIONS /api/import - CORS preflight
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Fallback for unsupported methods on the import route
pub async fn method_not_allowed() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(serde_json::json!({ "error": "Method not allowed" })),
    )
}
