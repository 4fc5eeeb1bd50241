//! agent-worker: standalone pool of task pollers.
//!
//! Reads the shared environment config, applies any command-line overrides,
//! and runs until SIGINT/SIGTERM.

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing::info;

use distcalc_agent::{shutdown_signal, Agent};
use distcalc_core::{load_dotenv, Config};

// ── CLI ─────────────────────────────────────────────────────────────

/// Arithmetic task worker.
#[derive(Parser, Debug)]
#[command(name = "agent-worker", version, about)]
struct Cli {
    /// Orchestrator base URL (overrides ORCHESTRATOR_URL).
    #[arg(long)]
    orchestrator_url: Option<String>,

    /// Number of concurrent pollers (overrides COMPUTING_POWER).
    #[arg(long)]
    computing_power: Option<usize>,

    /// Pause after an empty poll, in milliseconds (overrides AGENT_IDLE_BACKOFF_MS).
    #[arg(long)]
    idle_backoff_ms: Option<u64>,
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    load_dotenv();

    let mut config = Config::from_env();
    if let Some(url) = cli.orchestrator_url {
        config.agent.orchestrator_url = url;
    }
    if let Some(n) = cli.computing_power {
        config.agent.computing_power = n;
    }
    if let Some(ms) = cli.idle_backoff_ms {
        config.agent.idle_backoff_ms = ms;
    }
    config.validate().context("invalid configuration")?;
    config.log_summary();

    let agent = Agent::connect(config.agent.clone()).context("failed to build HTTP client")?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let stats = agent.run(shutdown_rx).await;
    info!(
        submitted = stats.submitted,
        compute_failures = stats.compute_failures,
        submit_failures = stats.submit_failures,
        "agent-worker exited cleanly"
    );
    Ok(())
}
