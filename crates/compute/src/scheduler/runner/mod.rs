//! Task scheduler runner -- owns expression/task state and serves workers.
//!
//! Split into focused submodules:
//! - `core`: Scheduler struct, constructor, submission, and accessor methods
//! - `dispatch`: handing the next ready task to a worker
//! - `reconcile`: folding worker results and failures back into state

mod core;
mod dispatch;
mod reconcile;

pub use self::core::Scheduler;
