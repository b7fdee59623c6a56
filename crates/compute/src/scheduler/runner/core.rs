use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use calcflow_core::{CalcError, Expression, ExpressionId, Task};
use tracing::{info, warn};

use crate::compiler;
use crate::scheduler::metrics::SchedulerMetrics;
use crate::scheduler::state::SchedulerState;
use crate::scheduler::types::{LiveCounts, SchedulerConfig};

/// The task scheduler. Compiles submitted expressions into task graphs,
/// hands ready tasks to workers one at a time, and reconciles their reports.
///
/// All state sits behind one mutex; every public operation is a single
/// critical section.
pub struct Scheduler {
    pub(super) config: SchedulerConfig,
    pub(super) state: Mutex<SchedulerState>,
    /// Scheduler metrics.
    pub(super) metrics: Arc<RwLock<SchedulerMetrics>>,
}

impl Scheduler {
    /// Create a new scheduler with empty state.
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(SchedulerState::default()),
            metrics: Arc::new(RwLock::new(SchedulerMetrics::default())),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub(super) fn lock_state(&self) -> Result<MutexGuard<'_, SchedulerState>, CalcError> {
        self.state
            .lock()
            .map_err(|e| CalcError::Internal(format!("SchedulerState lock poisoned: {}", e)))
    }

    /// Apply `f` to the metrics, refreshing live counts from `state`.
    pub(super) fn update_metrics(&self, state: &SchedulerState, f: impl FnOnce(&mut SchedulerMetrics)) {
        if let Ok(mut m) = self.metrics.write() {
            f(&mut m);
            m.live = state.live_counts();
        }
    }

    /// Compile `text` and store it as a new expression.
    ///
    /// Compilation runs under the state lock, so the expression and its whole
    /// task graph appear together or not at all.
    pub fn submit(&self, text: &str) -> Result<ExpressionId, CalcError> {
        let text = text.trim();
        let mut state = self.lock_state()?;

        let plan = match compiler::compile(text, state.next_expression_id(), state.next_task_id()) {
            Ok(plan) => plan,
            Err(e) => {
                warn!("Rejected expression {:?}: {}", text, e);
                self.update_metrics(&state, |m| m.record_rejection());
                return Err(e);
            }
        };

        let task_count = plan.tasks.len();
        let expression = state.commit(text, plan)?;
        let (id, complete) = (expression.id, expression.is_terminal());
        info!(expression_id = id, tasks = task_count, "Expression submitted: {}", text);

        self.update_metrics(&state, |m| m.record_submission(task_count, complete));
        Ok(id)
    }

    /// Snapshot of one expression.
    pub fn expression(&self, id: ExpressionId) -> Result<Expression, CalcError> {
        let state = self.lock_state()?;
        state
            .expressions
            .get(&id)
            .cloned()
            .ok_or(CalcError::ExpressionNotFound(id))
    }

    /// Snapshot of every expression, in id order.
    pub fn expressions(&self) -> Result<Vec<Expression>, CalcError> {
        let state = self.lock_state()?;
        Ok(state.expressions.values().cloned().collect())
    }

    /// Snapshot of every live (not yet retired) task, in id order.
    pub fn live_tasks(&self) -> Result<Vec<Task>, CalcError> {
        let state = self.lock_state()?;
        Ok(state.tasks.values().cloned().collect())
    }

    pub fn live_counts(&self) -> Result<LiveCounts, CalcError> {
        Ok(self.lock_state()?.live_counts())
    }

    /// Get a snapshot of the current scheduler metrics.
    pub fn metrics(&self) -> Result<SchedulerMetrics, CalcError> {
        self.metrics
            .read()
            .map(|m| m.clone())
            .map_err(|e| CalcError::Internal(format!("SchedulerMetrics lock poisoned: {}", e)))
    }

    /// Get an Arc to the metrics (for external reads without cloning).
    pub fn metrics_handle(&self) -> Arc<RwLock<SchedulerMetrics>> {
        Arc::clone(&self.metrics)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}
