//! JSON bodies exchanged between the orchestrator, its clients, and agents.
//!
//! Ids travel as decimal strings on the wire.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a submitted expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl ExpressionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ExpressionStatus::Pending => "pending",
            ExpressionStatus::InProgress => "in_progress",
            ExpressionStatus::Completed => "completed",
            ExpressionStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ExpressionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Client-facing API ─────────────────────────────────────────

/// `POST /api/v1/calculate` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitExpressionRequest {
    #[serde(default)]
    pub expression: String,
}

/// `POST /api/v1/calculate` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionCreated {
    pub id: String,
}

/// Public view of one expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionView {
    pub id: String,
    pub expression: String,
    pub status: ExpressionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpressionList {
    pub expressions: Vec<ExpressionView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpressionEnvelope {
    pub expression: ExpressionView,
}

// ── Agent-facing API ──────────────────────────────────────────

/// One task as handed to a polling agent.
///
/// `operation` stays a plain string so an agent can reject symbols it does
/// not understand instead of failing to decode the whole body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPayload {
    pub id: String,
    pub arg1: f64,
    pub arg2: f64,
    pub operation: String,
    /// Simulated computation time in milliseconds.
    pub operation_time: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEnvelope {
    pub task: TaskPayload,
}

/// `POST /internal/task` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResultRequest {
    #[serde(default)]
    pub id: String,
    pub result: f64,
}

// ── Generic responses ─────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { error: message.into() }
    }
}
