//! calcflow-server: HTTP orchestrator for distributed expression evaluation.

use clap::{Parser, Subcommand};

use calcflow_core::config::{load_dotenv, Config};
use calcflow_server::startup;

// ── CLI ─────────────────────────────────────────────────────────────

/// Calcflow orchestrator: accepts expressions and hands their tasks to agents.
#[derive(Parser, Debug)]
#[command(name = "calcflow-server", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server.
    Serve {
        /// Also run COMPUTING_POWER worker loops inside this process.
        #[arg(long, env = "CALCFLOW_AGENTS")]
        agents: bool,

        /// Override ORCHESTRATOR_PORT.
        #[arg(long)]
        port: Option<u16>,
    },
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    load_dotenv();
    let cli = Cli::parse();

    let mut config = Config::from_env();
    let (agents, port) = match cli.command {
        Some(Command::Serve { agents, port }) => (agents, port),
        None => (false, None),
    };
    if let Some(port) = port {
        config.server.port = port;
    }
    config.log_summary();

    startup::serve(config, agents).await
}
