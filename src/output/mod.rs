//! Output formatting module
//!
//! Renders ordered event logs and run summaries, and streams events live.

mod formatter;
mod live;

pub use formatter::{write_log_to_file, EventFormatter, OutputFormat};
pub use live::LiveReporter;
