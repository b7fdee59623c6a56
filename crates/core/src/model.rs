use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::CalcError;

pub type ExpressionId = u64;
pub type TaskId = u64;

// ── Operation ─────────────────────────────────────────────────

/// One of the four binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Operation {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
}

impl Operation {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operation::Add),
            '-' => Some(Operation::Subtract),
            '*' => Some(Operation::Multiply),
            '/' => Some(Operation::Divide),
            _ => None,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Operation::Add => '+',
            Operation::Subtract => '-',
            Operation::Multiply => '*',
            Operation::Divide => '/',
        }
    }

    /// Multiplicative operators bind tighter than additive ones.
    pub fn is_multiplicative(&self) -> bool {
        matches!(self, Operation::Multiply | Operation::Divide)
    }

    /// Perform the literal arithmetic. Division by an exact zero is an error,
    /// and so is any result that is not finite: JSON cannot carry it.
    pub fn apply(&self, lhs: f64, rhs: f64) -> Result<f64, CalcError> {
        let value = match self {
            Operation::Add => lhs + rhs,
            Operation::Subtract => lhs - rhs,
            Operation::Multiply => lhs * rhs,
            Operation::Divide => {
                if rhs == 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                lhs / rhs
            }
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(CalcError::Overflow)
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

// ── Task arguments ────────────────────────────────────────────

/// A task operand: either a literal value or a placeholder naming the task
/// whose result it will receive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arg {
    Literal(f64),
    TaskRef(TaskId),
}

impl Arg {
    pub fn task_ref(&self) -> Option<TaskId> {
        match self {
            Arg::TaskRef(id) => Some(*id),
            Arg::Literal(_) => None,
        }
    }
}

impl std::fmt::Display for Arg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arg::Literal(v) => write!(f, "{}", v),
            Arg::TaskRef(id) => write!(f, "#{}", id),
        }
    }
}

// ── Task ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Waiting,
    Dispatched,
    Complete,
}

/// One binary-operation step of an expression's evaluation plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub expression_id: ExpressionId,
    pub arg1: Arg,
    pub arg2: Arg,
    pub operation: Operation,
    pub status: TaskStatus,
    pub result: Option<f64>,
    /// Consumers (dependent tasks or the owning expression) that have not yet
    /// read this task's result. The task is retired when this reaches zero.
    pub pending_reads: u32,
    pub dispatched_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(
        id: TaskId,
        expression_id: ExpressionId,
        arg1: Arg,
        operation: Operation,
        arg2: Arg,
    ) -> Self {
        Self {
            id,
            expression_id,
            arg1,
            arg2,
            operation,
            status: TaskStatus::Waiting,
            result: None,
            pending_reads: 0,
            dispatched_at: None,
        }
    }

    /// Task ids this task depends on, in argument order.
    pub fn dependencies(&self) -> impl Iterator<Item = TaskId> {
        [self.arg1.task_ref(), self.arg2.task_ref()].into_iter().flatten()
    }
}

// ── Expression ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExpressionStatus {
    Waiting,
    Complete,
    Error,
}

impl std::fmt::Display for ExpressionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpressionStatus::Waiting => write!(f, "waiting"),
            ExpressionStatus::Complete => write!(f, "complete"),
            ExpressionStatus::Error => write!(f, "error"),
        }
    }
}

/// A submitted formula and its evaluation state.
///
/// Exactly one of these holds at any time: `pending_task_id` is set,
/// `status == Complete`, or `status == Error`. The constructors and the
/// `complete` / `fail` transitions keep that invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub id: ExpressionId,
    pub text: String,
    pub status: ExpressionStatus,
    pub pending_task_id: Option<TaskId>,
    pub result: Option<f64>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Expression {
    /// An expression waiting on its top-level task.
    pub fn waiting(id: ExpressionId, text: impl Into<String>, root: TaskId) -> Self {
        Self {
            id,
            text: text.into(),
            status: ExpressionStatus::Waiting,
            pending_task_id: Some(root),
            result: None,
            error: None,
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    /// An expression that compiled straight to a literal.
    pub fn completed(id: ExpressionId, text: impl Into<String>, result: f64) -> Self {
        let now = Utc::now();
        Self {
            id,
            text: text.into(),
            status: ExpressionStatus::Complete,
            pending_task_id: None,
            result: Some(result),
            error: None,
            created_at: now,
            finished_at: Some(now),
        }
    }

    pub fn complete(&mut self, result: f64) {
        self.status = ExpressionStatus::Complete;
        self.pending_task_id = None;
        self.result = Some(result);
        self.finished_at = Some(Utc::now());
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        self.status = ExpressionStatus::Error;
        self.pending_task_id = None;
        self.error = Some(reason.into());
        self.finished_at = Some(Utc::now());
    }

    pub fn is_terminal(&self) -> bool {
        self.status != ExpressionStatus::Waiting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_roundtrips_through_symbol() {
        for c in ['+', '-', '*', '/'] {
            let op = Operation::from_char(c).unwrap();
            assert_eq!(op.symbol(), c);
        }
        assert_eq!(Operation::from_char('%'), None);
    }

    #[test]
    fn operation_serializes_as_symbol() {
        let json = serde_json::to_string(&Operation::Divide).unwrap();
        assert_eq!(json, "\"/\"");
        let op: Operation = serde_json::from_str("\"*\"").unwrap();
        assert_eq!(op, Operation::Multiply);
    }

    #[test]
    fn apply_arithmetic() {
        assert_eq!(Operation::Add.apply(2.0, 3.0).unwrap(), 5.0);
        assert_eq!(Operation::Subtract.apply(2.0, 3.0).unwrap(), -1.0);
        assert_eq!(Operation::Multiply.apply(2.0, -3.0).unwrap(), -6.0);
        assert_eq!(Operation::Divide.apply(1.0, 4.0).unwrap(), 0.25);
        assert_eq!(
            Operation::Divide.apply(1.0, 0.0),
            Err(CalcError::DivisionByZero)
        );
    }

    #[test]
    fn apply_rejects_non_finite_results() {
        assert_eq!(Operation::Multiply.apply(1e200, 1e200), Err(CalcError::Overflow));
        assert_eq!(Operation::Add.apply(f64::MAX, f64::MAX), Err(CalcError::Overflow));
        assert_eq!(Operation::Divide.apply(1e300, 1e-300), Err(CalcError::Overflow));
        assert_eq!(CalcError::Overflow.to_string(), "result overflow");
    }

    #[test]
    fn expression_transitions_keep_invariant() {
        let mut expr = Expression::waiting(1, "1+2", 7);
        assert_eq!(expr.pending_task_id, Some(7));
        assert!(!expr.is_terminal());

        expr.complete(3.0);
        assert_eq!(expr.status, ExpressionStatus::Complete);
        assert_eq!(expr.pending_task_id, None);
        assert_eq!(expr.result, Some(3.0));

        let mut failed = Expression::waiting(2, "1/0", 8);
        failed.fail("division by zero");
        assert_eq!(failed.status, ExpressionStatus::Error);
        assert_eq!(failed.pending_task_id, None);
        assert_eq!(failed.result, None);
        assert_eq!(failed.error.as_deref(), Some("division by zero"));
    }

    #[test]
    fn task_dependencies_skip_literals() {
        let task = Task::new(3, 1, Arg::TaskRef(1), Operation::Add, Arg::Literal(2.0));
        assert_eq!(task.dependencies().collect::<Vec<_>>(), vec![1]);
        let task = Task::new(4, 1, Arg::TaskRef(1), Operation::Add, Arg::TaskRef(2));
        assert_eq!(task.dependencies().collect::<Vec<_>>(), vec![1, 2]);
    }
}
