//! Single polling loop: fetch, compute, wait, submit.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::client::TaskSource;
use crate::compute::calculate;

/// What one pass through the loop did.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Nothing queued.
    Idle,
    /// Could not reach the orchestrator or it answered unexpectedly.
    FetchFailed,
    /// The task could not be computed and was dropped.
    ComputeFailed { id: String },
    /// Result posted and accepted.
    Submitted { id: String, result: f64 },
    /// Result posted but rejected (or the post failed). Not retried.
    SubmitFailed { id: String },
}

impl Step {
    fn backs_off(&self) -> bool {
        matches!(self, Step::Idle | Step::FetchFailed)
    }
}

/// Per-worker totals returned when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub submitted: u64,
    pub compute_failures: u64,
    pub submit_failures: u64,
}

impl WorkerStats {
    fn record(&mut self, step: &Step) {
        match step {
            Step::Submitted { .. } => self.submitted += 1,
            Step::ComputeFailed { .. } => self.compute_failures += 1,
            Step::SubmitFailed { .. } => self.submit_failures += 1,
            Step::Idle | Step::FetchFailed => {}
        }
    }
}

pub struct Worker {
    index: usize,
    source: Arc<dyn TaskSource>,
    idle_backoff: Duration,
}

impl Worker {
    pub fn new(index: usize, source: Arc<dyn TaskSource>, idle_backoff: Duration) -> Self {
        Self {
            index,
            source,
            idle_backoff,
        }
    }

    /// Poll once and handle whatever came back.
    pub async fn step(&self) -> Step {
        let task = match self.source.fetch_task().await {
            Ok(Some(task)) => task,
            Ok(None) => {
                debug!(worker = self.index, "no task available");
                return Step::Idle;
            }
            Err(e) => {
                warn!(worker = self.index, error = %e, "failed to fetch task");
                return Step::FetchFailed;
            }
        };

        info!(
            worker = self.index,
            task_id = %task.id,
            "received task: {} {} {}",
            task.arg1,
            task.operation,
            task.arg2
        );

        let result = match calculate(&task) {
            Ok(v) => v,
            Err(e) => {
                warn!(worker = self.index, task_id = %task.id, error = %e, "dropping task");
                return Step::ComputeFailed { id: task.id };
            }
        };

        tokio::time::sleep(Duration::from_millis(task.operation_time)).await;

        match self.source.submit_result(&task.id, result).await {
            Ok(()) => {
                info!(worker = self.index, task_id = %task.id, result, "result submitted");
                Step::Submitted { id: task.id, result }
            }
            Err(e) => {
                warn!(worker = self.index, task_id = %task.id, error = %e, "result not accepted");
                Step::SubmitFailed { id: task.id }
            }
        }
    }

    /// Loop until `shutdown` flips to `true` or its sender goes away.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> WorkerStats {
        let mut stats = WorkerStats::default();
        debug!(worker = self.index, "worker started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            let step = tokio::select! {
                step = self.step() => step,
                _ = shutdown.changed() => break,
            };
            stats.record(&step);

            if step.backs_off() {
                tokio::select! {
                    _ = tokio::time::sleep(self.idle_backoff) => {}
                    _ = shutdown.changed() => break,
                }
            }
        }

        info!(
            worker = self.index,
            submitted = stats.submitted,
            compute_failures = stats.compute_failures,
            submit_failures = stats.submit_failures,
            "worker stopped"
        );
        stats
    }
}
