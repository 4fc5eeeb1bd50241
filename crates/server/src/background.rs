//! Periodic background jobs.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use distcalc_scheduler::SessionStore;

/// Log the work-queue depth every `interval` while it is non-empty.
pub fn spawn_queue_reporter(
    sessions: SessionStore,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
        // First tick fires immediately.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let queued = sessions.queue_len();
                    if queued > 0 {
                        info!(queued, "collecting tasks in queue");
                    }
                }
                _ = shutdown.changed() => break,
            }
        }
        debug!("queue reporter stopped");
    })
}
