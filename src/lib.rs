//! Ordinal Tracker - deterministic event ordering for concurrent suite runs
//!
//! Every event a runner reports carries an [`Ordinal`] handed out by a
//! [`Tracker`]. When work moves onto another task the tracker forks, and the
//! new branch sorts after everything already issued and before whatever the
//! parent issues next. Sorting the collected events by ordinal therefore gives
//! the same sequence on every run, whatever the thread interleaving was.
//!
//! ```
//! use ordinal_tracker::Tracker;
//!
//! let mut tracker = Tracker::new();
//! let first = tracker.next_ordinal();
//!
//! let mut child = tracker.next_tracker();
//! let nested = child.next_ordinal();
//! let after = tracker.next_ordinal();
//!
//! assert!(first < nested && nested < after);
//! ```

pub mod config;
pub mod executor;
pub mod models;
pub mod ordinal;
pub mod output;
pub mod reporter;
pub mod utils;

pub use ordinal::{Ordinal, OrdinalError, Tracker};
