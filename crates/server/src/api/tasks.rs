//! Agent-facing endpoints: hand out tasks and accept results.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::{debug, error};

use distcalc_core::{StatusResponse, TaskEnvelope, TaskResultRequest};
use distcalc_scheduler::{SessionError, TaskId};

use super::{api_error, ApiError, INVALID_BODY};
use crate::state::AppState;

/// `GET /internal/task`
pub async fn get_task(State(state): State<Arc<AppState>>) -> Result<Json<TaskEnvelope>, ApiError> {
    match state.sessions.next_task() {
        Some(task) => {
            debug!(task_id = %task.id, expression_id = %task.expression_id, "task dispatched");
            Ok(Json(TaskEnvelope {
                task: task.to_payload(),
            }))
        }
        None => Err(api_error(StatusCode::NOT_FOUND, "No task available")),
    }
}

/// `POST /internal/task`
///
/// A result that finishes an expression which then fails verification is
/// still applied; the response is 500 so the caller knows.
pub async fn submit_result(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TaskResultRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Ok(Json(req)) = payload else {
        return Err(api_error(StatusCode::UNPROCESSABLE_ENTITY, INVALID_BODY));
    };
    if req.id.is_empty() {
        return Err(api_error(StatusCode::UNPROCESSABLE_ENTITY, INVALID_BODY));
    }
    let not_found = || api_error(StatusCode::NOT_FOUND, "Task not found");
    let task_id: TaskId = req.id.parse().map_err(|_| not_found())?;

    match state.sessions.ingest_result(task_id, req.result) {
        Ok(ingested) => match ingested.verification {
            Some(v) if !v.is_confirmed() => Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Result computation incorrect",
            )),
            _ => Ok(Json(StatusResponse {
                status: "result accepted".to_string(),
            })),
        },
        Err(SessionError::TaskNotFound(_)) => {
            debug!(task_id = %task_id, "result for unknown task");
            Err(not_found())
        }
        Err(e) => {
            error!(task_id = %task_id, error = %e, "failed to apply result");
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"))
        }
    }
}
