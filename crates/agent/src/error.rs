use thiserror::Error;

use distcalc_core::ComputeError;

/// Errors a worker can hit while talking to the orchestrator or computing.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("orchestrator returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("compute error: {0}")]
    Compute(#[from] ComputeError),
}
