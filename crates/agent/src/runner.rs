//! Polling worker loops.
//!
//! An [`Agent`] runs `computing_power` independent loops against one
//! [`TaskSource`]. Each loop polls for a task, waits out its simulated
//! `operation_time`, computes it, reports, and then pauses for `wait_time`
//! before polling again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use calcflow_core::config::AgentConfig;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::compute::evaluate;
use crate::source::{ReportOutcome, TaskSource};

/// Poll once and process the task, if any. Returns whether a task was handled.
pub async fn run_once(source: &dyn TaskSource) -> anyhow::Result<bool> {
    let Some(task) = source.fetch_task().await? else {
        return Ok(false);
    };
    debug!(
        task_id = task.id,
        "Computing {} {} {} (sleep {}ms)",
        task.arg1, task.operation, task.arg2, task.operation_time
    );

    if task.operation_time > 0 {
        tokio::time::sleep(Duration::from_millis(task.operation_time)).await;
    }

    let report = evaluate(&task);
    if let Some(reason) = &report.error {
        debug!(task_id = task.id, "Task failed: {}", reason);
    }

    match source.report(&report).await? {
        ReportOutcome::Accepted => {}
        ReportOutcome::Unknown => {
            warn!(task_id = task.id, "Orchestrator dropped report for unknown task");
        }
    }
    Ok(true)
}

/// A pool of polling loops sharing one task source.
pub struct Agent {
    source: Arc<dyn TaskSource>,
    computing_power: usize,
    wait_time: Duration,
    /// Shutdown flag checked at the top of every iteration.
    stopped: Arc<AtomicBool>,
    /// Wakes loops out of an in-flight poll or pause.
    shutdown: Arc<Notify>,
}

impl Agent {
    pub fn new(source: Arc<dyn TaskSource>, config: &AgentConfig) -> Self {
        Self {
            source,
            computing_power: config.computing_power.max(1),
            wait_time: Duration::from_millis(config.wait_time_ms),
            stopped: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(Notify::new()),
        }
    }

    pub fn computing_power(&self) -> usize {
        self.computing_power
    }

    /// Spawn every loop onto the current tokio runtime.
    pub fn spawn(&self) -> Vec<JoinHandle<()>> {
        info!(
            "Agent starting {} loops (wait_time: {:?})",
            self.computing_power, self.wait_time
        );
        (0..self.computing_power)
            .map(|index| {
                let source = Arc::clone(&self.source);
                let stopped = Arc::clone(&self.stopped);
                let shutdown = Arc::clone(&self.shutdown);
                let wait_time = self.wait_time;
                tokio::spawn(async move {
                    worker_loop(index, source, wait_time, stopped, shutdown).await;
                })
            })
            .collect()
    }

    /// Signal every loop to stop after its current step.
    pub fn stop(&self) {
        info!("Agent shutdown requested");
        self.stopped.store(true, Ordering::Relaxed);
        self.shutdown.notify_waiters();
    }
}

async fn worker_loop(
    index: usize,
    source: Arc<dyn TaskSource>,
    wait_time: Duration,
    stopped: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
) {
    debug!(worker = index, "Worker loop started");
    while !stopped.load(Ordering::Relaxed) {
        tokio::select! {
            result = run_once(source.as_ref()) => {
                if let Err(e) = result {
                    warn!(worker = index, error = %e, "Worker iteration failed");
                }
            }
            _ = shutdown.notified() => break,
        }

        tokio::select! {
            _ = tokio::time::sleep(wait_time) => {}
            _ = shutdown.notified() => break,
        }
    }
    debug!(worker = index, "Worker loop stopped");
}
