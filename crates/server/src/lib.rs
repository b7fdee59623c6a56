//! calcflow HTTP service: expression submission, the worker protocol, and a
//! small HTML front page.

pub mod api;
pub mod router;
pub mod startup;
pub mod state;

pub use router::build_router;
pub use state::AppState;
