//! HTTP handlers, one module per audience.

mod expressions;
mod health;
mod tasks;

use axum::http::StatusCode;
use axum::Json;

use distcalc_core::ErrorResponse;

// ── Shared types ─────────────────────────────────────────────────

/// Error half of every fallible handler.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, message: &str) -> ApiError {
    (status, Json(ErrorResponse::new(message)))
}

pub(crate) const INVALID_BODY: &str = "Invalid Body";

// ── Re-exports ───────────────────────────────────────────────────

pub use expressions::{calculate, get_expression, list_expressions};
pub use health::{health, not_found, HealthResponse};
pub use tasks::{get_task, submit_result};
