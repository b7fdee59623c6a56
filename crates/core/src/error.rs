use thiserror::Error;

use crate::model::{ExpressionId, TaskId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("Expression is not valid: {0}")]
    InvalidExpression(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Expression not found: {0}")]
    ExpressionNotFound(ExpressionId),

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Task {0} is not dispatched")]
    TaskNotDispatched(TaskId),

    #[error("No task ready for dispatch")]
    NoTaskReady,

    #[error("division by zero")]
    DivisionByZero,

    #[error("result overflow")]
    Overflow,
}

impl CalcError {
    /// Shorthand for [`CalcError::InvalidExpression`].
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidExpression(reason.into())
    }

    /// True for every error a caller should treat as "not found" (HTTP 404).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ExpressionNotFound(_)
                | Self::TaskNotFound(_)
                | Self::TaskNotDispatched(_)
                | Self::NoTaskReady
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_family() {
        assert!(CalcError::ExpressionNotFound(1).is_not_found());
        assert!(CalcError::TaskNotFound(1).is_not_found());
        assert!(CalcError::TaskNotDispatched(1).is_not_found());
        assert!(CalcError::NoTaskReady.is_not_found());
        assert!(!CalcError::invalid("x").is_not_found());
        assert!(!CalcError::DivisionByZero.is_not_found());
        assert!(!CalcError::Overflow.is_not_found());
    }

    #[test]
    fn division_by_zero_message_matches_worker_reason() {
        assert_eq!(CalcError::DivisionByZero.to_string(), "division by zero");
    }
}
