//! The arithmetic a worker performs on a dispatched task.

use calcflow_core::{TaskAssignment, TaskReport};

/// Apply the task's operator and build the report to send back.
///
/// Division by zero and results too large for an `f64` produce a failure
/// report carrying the error text.
pub fn evaluate(task: &TaskAssignment) -> TaskReport {
    match task.operation.apply(task.arg1, task.arg2) {
        Ok(result) => TaskReport::success(task.id, result),
        Err(e) => TaskReport::failure(task.id, e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use calcflow_core::Operation;

    use super::*;

    fn task(arg1: f64, operation: Operation, arg2: f64) -> TaskAssignment {
        TaskAssignment {
            id: 5,
            arg1,
            arg2,
            operation,
            operation_time: 0,
        }
    }

    #[test]
    fn evaluates_each_operator() {
        assert_eq!(evaluate(&task(6.0, Operation::Add, 2.0)).result, 8.0);
        assert_eq!(evaluate(&task(6.0, Operation::Subtract, 2.0)).result, 4.0);
        assert_eq!(evaluate(&task(6.0, Operation::Multiply, 2.0)).result, 12.0);
        assert_eq!(evaluate(&task(6.0, Operation::Divide, 2.0)).result, 3.0);
    }

    #[test]
    fn division_by_zero_is_a_failure_report() {
        let report = evaluate(&task(1.0, Operation::Divide, 0.0));
        assert_eq!(report, TaskReport::failure(5, "division by zero"));
    }

    #[test]
    fn overflow_is_a_failure_report() {
        let report = evaluate(&task(1e200, Operation::Multiply, 1e200));
        assert_eq!(report, TaskReport::failure(5, "result overflow"));
        assert!(serde_json::to_value(&report).unwrap()["error"].is_string());

        let report = evaluate(&task(-f64::MAX, Operation::Subtract, f64::MAX));
        assert_eq!(report.error.as_deref(), Some("result overflow"));
    }

    #[test]
    fn zero_numerator_is_fine() {
        let report = evaluate(&task(0.0, Operation::Divide, 4.0));
        assert_eq!(report, TaskReport::success(5, 0.0));
    }
}
