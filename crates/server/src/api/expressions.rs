//! Client-facing endpoints: submit expressions and read their state.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::{debug, warn};

use distcalc_core::{ExpressionCreated, ExpressionEnvelope, ExpressionList, SubmitExpressionRequest};
use distcalc_scheduler::{ExpressionId, SessionError};

use super::{api_error, ApiError, INVALID_BODY};
use crate::state::AppState;

/// `POST /api/v1/calculate`
pub async fn calculate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SubmitExpressionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Ok(Json(req)) = payload else {
        return Err(api_error(StatusCode::UNPROCESSABLE_ENTITY, INVALID_BODY));
    };
    if req.expression.is_empty() {
        return Err(api_error(StatusCode::UNPROCESSABLE_ENTITY, INVALID_BODY));
    }

    match state.sessions.submit(&req.expression) {
        Ok(id) => Ok((
            StatusCode::CREATED,
            Json(ExpressionCreated { id: id.to_string() }),
        )),
        Err(SessionError::InvalidExpression(e)) => {
            debug!(expression = %req.expression, error = %e, "rejected expression");
            Err(api_error(StatusCode::UNPROCESSABLE_ENTITY, "Invalid expression"))
        }
        Err(e) => {
            warn!(error = %e, "failed to register expression");
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"))
        }
    }
}

/// `GET /api/v1/expressions`
pub async fn list_expressions(State(state): State<Arc<AppState>>) -> Json<ExpressionList> {
    Json(ExpressionList {
        expressions: state.sessions.list(),
    })
}

/// `GET /api/v1/expressions/{id}`
pub async fn get_expression(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ExpressionEnvelope>, ApiError> {
    id.parse::<ExpressionId>()
        .ok()
        .and_then(|id| state.sessions.get(id))
        .map(|expression| Json(ExpressionEnvelope { expression }))
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Expression not found"))
}
