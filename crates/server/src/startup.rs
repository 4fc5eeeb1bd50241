//! Server startup: bind, spawn background work, serve until shutdown.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};

use distcalc_agent::{shutdown_signal, Agent};
use distcalc_core::Config;

use crate::background::spawn_queue_reporter;
use crate::router::build_router;
use crate::state::AppState;

/// Serve `state` on `listener` until `shutdown` flips to `true`.
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: watch::Receiver<bool>,
) -> std::io::Result<()> {
    let interval = Duration::from_secs(state.config.server.queue_report_interval_secs);
    let reporter = spawn_queue_reporter(state.sessions.clone(), interval, shutdown.clone());

    let mut stop = shutdown;
    let app = build_router(state);
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = stop.wait_for(|stopped| *stopped).await;
        })
        .await;

    reporter.abort();
    result
}

/// Address the in-process agent should use to reach this server.
fn loopback_url(addr: SocketAddr) -> String {
    if addr.ip().is_unspecified() {
        format!("http://127.0.0.1:{}", addr.port())
    } else {
        format!("http://{}", addr)
    }
}

/// Run the orchestrator, optionally with an agent pool in the same process.
pub async fn run(config: Config, with_agent: bool) -> anyhow::Result<()> {
    let addr = config.server.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    let local = listener.local_addr()?;
    info!("Server listening on http://{}", local);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let agent = if with_agent {
        let mut agent_config = config.agent.clone();
        agent_config.orchestrator_url = loopback_url(local);
        let agent = Agent::connect(agent_config).context("failed to build agent HTTP client")?;
        Some(tokio::spawn(agent.run(shutdown_rx.clone())))
    } else {
        None
    };

    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let state = Arc::new(AppState::new(config));
    serve(listener, state, shutdown_rx).await?;

    if let Some(handle) = agent {
        match handle.await {
            Ok(stats) => info!(submitted = stats.submitted, "in-process agent stopped"),
            Err(e) => error!(error = %e, "in-process agent panicked"),
        }
    }
    info!("server stopped");
    Ok(())
}
