use std::sync::Arc;

use chrono::{DateTime, Utc};

use calcflow_compute::{Scheduler, SchedulerConfig};
use calcflow_core::Config;

/// Shared state handed to every handler.
pub struct AppState {
    pub scheduler: Arc<Scheduler>,
    pub config: Config,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Fresh state with an empty scheduler configured from `config`.
    pub fn new(config: Config) -> Self {
        let scheduler = Arc::new(Scheduler::new(SchedulerConfig::from_config(&config)));
        Self::with_scheduler(config, scheduler)
    }

    pub fn with_scheduler(config: Config, scheduler: Arc<Scheduler>) -> Self {
        Self {
            scheduler,
            config,
            started_at: Utc::now(),
        }
    }
}
