use std::collections::BTreeMap;

use calcflow_core::{
    Arg, CalcError, Expression, ExpressionId, ExpressionStatus, Task, TaskId, TaskStatus,
};
use tracing::debug;

use crate::compiler::Plan;

use super::types::LiveCounts;

/// Every expression ever submitted and every task not yet retired.
///
/// Both maps are keyed by monotonically increasing ids, so iterating them
/// visits entries in creation order.
#[derive(Debug)]
pub struct SchedulerState {
    pub expressions: BTreeMap<ExpressionId, Expression>,
    pub tasks: BTreeMap<TaskId, Task>,
    next_expression_id: ExpressionId,
    next_task_id: TaskId,
}

impl Default for SchedulerState {
    fn default() -> Self {
        Self {
            expressions: BTreeMap::new(),
            tasks: BTreeMap::new(),
            next_expression_id: 1,
            next_task_id: 1,
        }
    }
}

impl SchedulerState {
    /// Id the next committed expression will receive.
    pub fn next_expression_id(&self) -> ExpressionId {
        self.next_expression_id
    }

    /// Id the first task of the next committed plan will receive.
    pub fn next_task_id(&self) -> TaskId {
        self.next_task_id
    }

    /// Store a compiled plan as a new expression. The plan must have been
    /// compiled against the current id counters.
    pub fn commit(&mut self, text: &str, plan: Plan) -> Result<&Expression, CalcError> {
        let id = self.next_expression_id;
        if let Some(stray) = plan.tasks.iter().find(|t| t.expression_id != id) {
            return Err(CalcError::Internal(format!(
                "task {} was compiled for expression {}, expected {}",
                stray.id, stray.expression_id, id
            )));
        }

        let expression = match plan.root {
            Arg::Literal(value) => Expression::completed(id, text, value),
            Arg::TaskRef(root) => Expression::waiting(id, text, root),
        };

        self.next_expression_id += 1;
        self.next_task_id += plan.tasks.len() as TaskId;
        for task in plan.tasks {
            self.tasks.insert(task.id, task);
        }
        Ok(&*self.expressions.entry(id).or_insert(expression))
    }

    /// Literal value of `arg`, if it is a literal or names a completed task.
    pub fn resolve(&self, arg: Arg) -> Option<f64> {
        match arg {
            Arg::Literal(v) => Some(v),
            Arg::TaskRef(id) => self
                .tasks
                .get(&id)
                .filter(|t| t.status == TaskStatus::Complete)
                .and_then(|t| t.result),
        }
    }

    /// First waiting task, in creation order, whose arguments both resolve.
    pub fn next_ready(&self) -> Option<(TaskId, f64, f64)> {
        self.tasks
            .values()
            .filter(|t| t.status == TaskStatus::Waiting)
            .find_map(|t| Some((t.id, self.resolve(t.arg1)?, self.resolve(t.arg2)?)))
    }

    /// Record that one consumer has read `id`'s result, retiring the task
    /// once no consumers remain.
    pub fn record_read(&mut self, id: TaskId) {
        let Some(task) = self.tasks.get_mut(&id) else {
            return;
        };
        task.pending_reads = task.pending_reads.saturating_sub(1);
        if task.pending_reads == 0 {
            self.tasks.remove(&id);
            debug!(task_id = id, "Task retired");
        }
    }

    /// Drop every live task owned by `expression_id`. Returns how many went.
    pub fn remove_tasks_of(&mut self, expression_id: ExpressionId) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|_, t| t.expression_id != expression_id);
        before - self.tasks.len()
    }

    pub fn live_counts(&self) -> LiveCounts {
        LiveCounts {
            waiting_expressions: self
                .expressions
                .values()
                .filter(|e| e.status == ExpressionStatus::Waiting)
                .count(),
            live_tasks: self.tasks.len(),
        }
    }
}
