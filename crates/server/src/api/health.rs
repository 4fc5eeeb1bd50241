use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use super::{api_error, ApiError};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub queued_tasks: usize,
    pub pending_tasks: usize,
    pub expressions: usize,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let stats = state.sessions.stats();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        queued_tasks: stats.queued_tasks,
        pending_tasks: stats.pending_tasks,
        expressions: stats.expressions,
    })
}

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    api_error(StatusCode::NOT_FOUND, "Not Found")
}
