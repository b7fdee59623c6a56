pub mod compiler;
pub mod scheduler;

pub use compiler::{compile, Plan};
pub use scheduler::{LiveCounts, Scheduler, SchedulerConfig, SchedulerMetrics};
