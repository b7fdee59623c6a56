use calcflow_core::{CalcError, TaskAssignment, TaskStatus};
use chrono::Utc;
use tracing::debug;

use super::Scheduler;

impl Scheduler {
    /// Hand the oldest ready task to a worker.
    ///
    /// The task moves to `dispatched` before the lock is released, so no
    /// other caller can receive it. Placeholder arguments are replaced by
    /// their values and each dependency read is recorded, retiring any
    /// dependency with no readers left.
    pub fn dispatch(&self) -> Result<TaskAssignment, CalcError> {
        let mut state = self.lock_state()?;
        let (id, arg1, arg2) = state.next_ready().ok_or(CalcError::NoTaskReady)?;

        let task = state
            .tasks
            .get_mut(&id)
            .ok_or(CalcError::TaskNotFound(id))?;
        task.status = TaskStatus::Dispatched;
        task.dispatched_at = Some(Utc::now());
        let operation = task.operation;
        let dependencies: Vec<_> = task.dependencies().collect();

        for dep in dependencies {
            state.record_read(dep);
        }

        let assignment = TaskAssignment {
            id,
            arg1,
            arg2,
            operation,
            operation_time: self.config.timings.for_operation(operation),
        };
        debug!(
            task_id = id,
            "Dispatched {} {} {} ({}ms)",
            arg1, operation, arg2, assignment.operation_time
        );

        self.update_metrics(&state, |m| m.record_dispatch(operation));
        Ok(assignment)
    }
}
