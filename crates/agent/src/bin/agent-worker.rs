//! agent-worker: polls the orchestrator for ready tasks and computes them.
//!
//! Runs `COMPUTING_POWER` concurrent loops against `GET /internal/task`,
//! reporting each result back with `POST /internal/task`.

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use calcflow_agent::{Agent, HttpTaskSource};
use calcflow_core::config::{load_dotenv, Config};

// ── CLI ─────────────────────────────────────────────────────────────

/// Calcflow agent: computes expression tasks handed out by the orchestrator.
#[derive(Parser, Debug)]
#[command(name = "agent-worker", version, about)]
struct Cli {
    /// Orchestrator base URL (default: http://localhost:{ORCHESTRATOR_PORT}).
    #[arg(long, env = "ORCHESTRATOR_URL")]
    orchestrator_url: Option<String>,

    /// Number of concurrent polling loops.
    #[arg(long, env = "COMPUTING_POWER")]
    computing_power: Option<usize>,

    /// Pause between polls, in milliseconds.
    #[arg(long, env = "WAIT_TIME")]
    wait_time: Option<u64>,
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

    load_dotenv();
    let cli = Cli::parse();

    let config = Config::from_env();
    let mut agent_config = config.agent.clone();
    if let Some(url) = cli.orchestrator_url {
        agent_config.orchestrator_url = url;
    }
    if let Some(power) = cli.computing_power {
        agent_config.computing_power = power.max(1);
    }
    if let Some(wait) = cli.wait_time {
        agent_config.wait_time_ms = wait;
    }

    info!(
        orchestrator = %agent_config.orchestrator_url,
        computing_power = agent_config.computing_power,
        wait_time_ms = agent_config.wait_time_ms,
        "agent-worker starting"
    );

    let source = Arc::new(HttpTaskSource::new(&agent_config.orchestrator_url));
    let agent = Agent::new(source, &agent_config);
    let handles = agent.spawn();

    tokio::signal::ctrl_c().await?;
    agent.stop();
    for handle in handles {
        handle.await?;
    }

    info!("agent-worker stopped");
    Ok(())
}
