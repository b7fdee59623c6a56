//! Expression task scheduler.
//!
//! The [`Scheduler`] stores submitted expressions and the task graphs the
//! compiler builds for them. Workers poll it for ready tasks through
//! [`Scheduler::dispatch`] and report back through
//! [`Scheduler::report_result`] or [`Scheduler::report_failure`]; a failure
//! cascades to every remaining task of the same expression.

pub mod metrics;
pub mod runner;
pub mod state;
pub mod types;

pub use metrics::SchedulerMetrics;
pub use runner::Scheduler;
pub use state::SchedulerState;
pub use types::{LiveCounts, SchedulerConfig};
