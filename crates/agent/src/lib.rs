//! Worker agent: polls the orchestrator for tasks, computes them, and posts
//! the results back.

pub mod client;
pub mod compute;
pub mod error;
pub mod pool;
pub mod signal;
pub mod worker;

pub use client::{HttpTaskSource, TaskSource};
pub use compute::calculate;
pub use error::AgentError;
pub use pool::Agent;
pub use signal::shutdown_signal;
pub use worker::{Step, Worker, WorkerStats};
