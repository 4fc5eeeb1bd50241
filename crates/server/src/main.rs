//! distcalc: distributed arithmetic orchestrator.

use anyhow::Context;
use clap::{Parser, Subcommand};

use distcalc_core::{load_dotenv, Config};

// ── CLI ─────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "distcalc", version, about)]
struct Cli {
    /// Listen port (overrides PORT).
    #[arg(long, global = true)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the orchestrator only (default).
    Serve,
    /// Run the orchestrator together with an in-process agent pool.
    Run {
        /// Number of in-process pollers (overrides COMPUTING_POWER).
        #[arg(long)]
        computing_power: Option<usize>,
    },
}

fn load_config() -> Config {
    load_dotenv();
    Config::from_env()
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
    let mut config = load_config();
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let with_agent = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => false,
        Command::Run { computing_power } => {
            if let Some(n) = computing_power {
                config.agent.computing_power = n;
            }
            true
        }
    };

    config.validate().context("invalid configuration")?;
    config.log_summary();

    distcalc_server::run(config, with_agent).await
}
