pub mod compute;
pub mod runner;
pub mod source;

pub use compute::evaluate;
pub use runner::{run_once, Agent};
pub use source::{HttpTaskSource, LocalTaskSource, ReportOutcome, TaskSource};
