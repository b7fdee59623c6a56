//! Expression compiler: turns formula text into a dependency graph of
//! binary-operation tasks.
//!
//! Parenthesised groups are compiled innermost-first and replaced by the
//! operand they produce. Each bracket-free level is then tokenised and
//! linearised by precedence: the leftmost `*` or `/` is emitted first, and
//! once none remain, the leftmost `+` or `-`. Every emitted task takes the
//! place of its three tokens as a [`Arg::TaskRef`] placeholder.
//!
//! Compilation never touches scheduler state. The returned [`Plan`] is
//! committed by the caller in a single step, so a rejected expression
//! leaves nothing behind.

pub mod lexer;
mod brackets;
mod linearize;

use calcflow_core::{Arg, CalcError, ExpressionId, Operation, Task, TaskId};
use tracing::debug;

/// Groups nested deeper than this are rejected rather than recursed into.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Output of compiling one expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    /// Tasks in emission order. Every dependency precedes its dependents.
    pub tasks: Vec<Task>,
    /// A literal when the expression needed no tasks, otherwise the
    /// placeholder of the task whose result is the expression's value.
    pub root: Arg,
}

impl Plan {
    /// The value of an expression that compiled without emitting tasks.
    pub fn literal(&self) -> Option<f64> {
        match self.root {
            Arg::Literal(v) => Some(v),
            Arg::TaskRef(_) => None,
        }
    }
}

/// Compile `text` for expression `expression_id`, numbering tasks from
/// `first_task_id` upward.
pub fn compile(
    text: &str,
    expression_id: ExpressionId,
    first_task_id: TaskId,
) -> Result<Plan, CalcError> {
    Compiler::new(expression_id, first_task_id).compile(text)
}

pub(crate) struct Compiler {
    expression_id: ExpressionId,
    next_task_id: TaskId,
    tasks: Vec<Task>,
    depth: usize,
}

impl Compiler {
    pub(crate) fn new(expression_id: ExpressionId, first_task_id: TaskId) -> Self {
        Self {
            expression_id,
            next_task_id: first_task_id,
            tasks: Vec::new(),
            depth: 0,
        }
    }

    pub(crate) fn compile(mut self, text: &str) -> Result<Plan, CalcError> {
        let stripped: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        if stripped.is_empty() {
            return Err(CalcError::invalid("expression is empty"));
        }

        let root = self.compile_group(&stripped)?;
        // The expression itself is the root task's only consumer.
        if let Some(id) = root.task_ref() {
            self.task_mut(id)?.pending_reads += 1;
        }

        debug!(
            "Compiled expression {} into {} tasks (root: {})",
            self.expression_id,
            self.tasks.len(),
            root
        );
        Ok(Plan {
            tasks: self.tasks,
            root,
        })
    }

    /// Compile one bracket level down to a single operand.
    fn compile_group(&mut self, text: &str) -> Result<Arg, CalcError> {
        if text.is_empty() {
            return Err(CalcError::invalid("empty parentheses"));
        }
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(CalcError::invalid("parentheses nested too deeply"));
        }

        self.depth += 1;
        let result = self
            .resolve_brackets(text)
            .and_then(|pieces| self.tokenize(&pieces))
            .and_then(|tokens| self.linearize(tokens));
        self.depth -= 1;
        result
    }

    /// Append a task and return the placeholder standing for its result.
    fn emit(&mut self, arg1: Arg, operation: Operation, arg2: Arg) -> Result<Arg, CalcError> {
        for dep in [arg1.task_ref(), arg2.task_ref()].into_iter().flatten() {
            self.task_mut(dep)?.pending_reads += 1;
        }

        let id = self.next_task_id;
        self.next_task_id += 1;
        debug!("  task {}: {} {} {}", id, arg1, operation, arg2);
        self.tasks
            .push(Task::new(id, self.expression_id, arg1, operation, arg2));
        Ok(Arg::TaskRef(id))
    }

    fn task_mut(&mut self, id: TaskId) -> Result<&mut Task, CalcError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| CalcError::Internal(format!("placeholder #{} has no task", id)))
    }
}
