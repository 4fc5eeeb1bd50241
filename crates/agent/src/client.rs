//! Orchestrator access for workers.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use distcalc_core::{TaskEnvelope, TaskPayload, TaskResultRequest};

use crate::error::AgentError;

/// Where workers get tasks from and send results to.
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Next task, or `None` when the orchestrator has nothing queued.
    async fn fetch_task(&self) -> Result<Option<TaskPayload>, AgentError>;

    async fn submit_result(&self, id: &str, result: f64) -> Result<(), AgentError>;
}

/// [`TaskSource`] over the orchestrator's `/internal/task` endpoint.
pub struct HttpTaskSource {
    base_url: String,
    http: reqwest::Client,
}

impl HttpTaskSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AgentError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, http))
    }

    /// Share an existing client (and its connection pool).
    pub fn with_client(base_url: &str, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    fn task_url(&self) -> String {
        format!("{}/internal/task", self.base_url)
    }
}

async fn rejected(resp: reqwest::Response) -> AgentError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    AgentError::Rejected { status, body }
}

#[async_trait]
impl TaskSource for HttpTaskSource {
    async fn fetch_task(&self) -> Result<Option<TaskPayload>, AgentError> {
        let resp = self.http.get(self.task_url()).send().await?;
        match resp.status() {
            StatusCode::OK => {
                let envelope: TaskEnvelope = resp.json().await?;
                Ok(Some(envelope.task))
            }
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(rejected(resp).await),
        }
    }

    async fn submit_result(&self, id: &str, result: f64) -> Result<(), AgentError> {
        let body = TaskResultRequest {
            id: id.to_string(),
            result,
        };
        let resp = self.http.post(self.task_url()).json(&body).send().await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(rejected(resp).await)
        }
    }
}
