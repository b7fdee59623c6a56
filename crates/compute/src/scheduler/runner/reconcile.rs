use calcflow_core::{CalcError, ExpressionId, Operation, TaskId, TaskStatus};
use chrono::Utc;
use tracing::{info, warn};

use crate::scheduler::state::SchedulerState;

use super::Scheduler;

impl Scheduler {
    /// Record a successful result for a dispatched task.
    ///
    /// Dependents pick the value up at their next dispatch. If the task is
    /// its expression's root, the expression completes and the task retires.
    /// A result that is not finite is recorded as an overflow failure.
    pub fn report_result(&self, id: TaskId, result: f64) -> Result<(), CalcError> {
        if !result.is_finite() {
            return self.report_failure(id, &CalcError::Overflow.to_string());
        }
        let mut state = self.lock_state()?;
        let (expression_id, operation, turnaround) = check_dispatched(&state, id)?;

        if let Some(task) = state.tasks.get_mut(&id) {
            task.status = TaskStatus::Complete;
            task.result = Some(result);
        }

        let expression = state
            .expressions
            .get_mut(&expression_id)
            .ok_or(CalcError::ExpressionNotFound(expression_id))?;
        let finished = expression.pending_task_id == Some(id);
        if finished {
            expression.complete(result);
            state.record_read(id);
            info!(expression_id, result, "Expression complete");
        }

        self.update_metrics(&state, |m| {
            m.record_completion(operation, turnaround);
            if finished {
                m.record_expression_completed();
            }
        });
        Ok(())
    }

    /// Record a failure for a dispatched task: the owning expression moves to
    /// `error` and all of its remaining tasks are dropped.
    pub fn report_failure(&self, id: TaskId, reason: &str) -> Result<(), CalcError> {
        let mut state = self.lock_state()?;
        let (expression_id, _, _) = check_dispatched(&state, id)?;

        let removed = state.remove_tasks_of(expression_id);
        let expression = state
            .expressions
            .get_mut(&expression_id)
            .ok_or(CalcError::ExpressionNotFound(expression_id))?;
        expression.fail(reason);
        warn!(
            expression_id,
            task_id = id,
            "Expression failed: {} ({} tasks dropped)",
            reason,
            removed
        );

        self.update_metrics(&state, |m| m.record_failure(removed.saturating_sub(1)));
        Ok(())
    }
}

/// Validate that `id` is currently dispatched and return its owner, operator
/// and time since dispatch.
fn check_dispatched(
    state: &SchedulerState,
    id: TaskId,
) -> Result<(ExpressionId, Operation, std::time::Duration), CalcError> {
    let task = state.tasks.get(&id).ok_or(CalcError::TaskNotFound(id))?;
    if task.status != TaskStatus::Dispatched {
        return Err(CalcError::TaskNotDispatched(id));
    }
    let turnaround = task
        .dispatched_at
        .and_then(|at| (Utc::now() - at).to_std().ok())
        .unwrap_or_default();
    Ok((task.expression_id, task.operation, turnaround))
}
