//! Data models for ordered reporting
//!
//! Events carried from runners to reporters, and the suite plans runners execute.

mod event;
mod plan;

pub use event::{Event, EventKind};
pub use plan::{Outcome, SuitePlan, TestPlan};
