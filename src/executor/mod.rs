//! Suite execution engine
//!
//! Provides sequential and parallel suite execution with ordered reporting.

mod parallel;
mod runner;

pub use parallel::ParallelExecutor;
pub use runner::SuiteRunner;
