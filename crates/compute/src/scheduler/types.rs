use calcflow_core::config::{Config, OperationTimings};
use serde::{Deserialize, Serialize};

/// Scheduler configuration, taken from the process [`Config`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Simulated per-operator cost handed to workers with each task.
    #[serde(default)]
    pub timings: OperationTimings,
}

impl SchedulerConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            timings: config.timings.clone(),
        }
    }
}

/// Snapshot of what the scheduler currently holds in memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LiveCounts {
    /// Expressions still waiting on their root task.
    pub waiting_expressions: usize,
    /// Tasks not yet retired (waiting, dispatched, or complete but unread).
    pub live_tasks: usize,
}
