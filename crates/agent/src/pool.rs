use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{error, info};

use distcalc_core::AgentConfig;

use crate::client::{HttpTaskSource, TaskSource};
use crate::error::AgentError;
use crate::worker::{Worker, WorkerStats};

/// `computing_power` independent workers sharing one task source.
pub struct Agent {
    config: AgentConfig,
    source: Arc<dyn TaskSource>,
}

impl Agent {
    pub fn new(config: AgentConfig, source: Arc<dyn TaskSource>) -> Self {
        Self { config, source }
    }

    /// Agent talking HTTP to `config.orchestrator_url`.
    pub fn connect(config: AgentConfig) -> Result<Self, AgentError> {
        let source = HttpTaskSource::new(&config.orchestrator_url, config.request_timeout())?;
        Ok(Self::new(config, Arc::new(source)))
    }

    /// Run every worker until `shutdown` flips, then return their totals.
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> WorkerStats {
        let workers = self.config.computing_power.max(1);
        info!(
            workers,
            orchestrator = %self.config.orchestrator_url,
            "agent starting"
        );

        let mut set = JoinSet::new();
        for index in 0..workers {
            let worker = Worker::new(index, self.source.clone(), self.config.idle_backoff());
            set.spawn(worker.run(shutdown.clone()));
        }

        let mut total = WorkerStats::default();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(stats) => {
                    total.submitted += stats.submitted;
                    total.compute_failures += stats.compute_failures;
                    total.submit_failures += stats.submit_failures;
                }
                Err(e) => error!(error = %e, "worker task panicked"),
            }
        }

        info!(submitted = total.submitted, "agent stopped");
        total
    }
}
