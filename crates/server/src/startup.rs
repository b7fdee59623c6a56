//! Server startup: shared state, optional in-process agents, and the listener.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use calcflow_agent::{Agent, LocalTaskSource};
use calcflow_core::Config;

use crate::router::build_router;
use crate::state::AppState;

/// Build `AppState` for `config` and start the worker loops when requested.
pub fn build_app_state(config: Config, with_agents: bool) -> (Arc<AppState>, Option<Agent>) {
    let state = Arc::new(AppState::new(config));

    let agent = with_agents.then(|| {
        let source = Arc::new(LocalTaskSource::new(Arc::clone(&state.scheduler)));
        Agent::new(source, &state.config.agent)
    });

    (state, agent)
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(config: Config, with_agents: bool) -> anyhow::Result<()> {
    let addr = config.server.bind_addr();
    let (state, agent) = build_app_state(config, with_agents);

    let handles = match &agent {
        Some(agent) => {
            info!("Starting {} in-process agent loops", agent.computing_power());
            agent.spawn()
        }
        None => Vec::new(),
    };

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(agent) = agent {
        agent.stop();
        for handle in handles {
            handle.await?;
        }
    }
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
