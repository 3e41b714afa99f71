//! Unordered live output
//!
//! Writes each event the moment it is reported, in arrival order. Lines from
//! parallel suites interleave however the tasks were scheduled; the ordered
//! log is printed separately once the run finishes.

use std::io::{self, Write};
use std::sync::Mutex;
use tracing::warn;

use super::EventFormatter;
use crate::models::Event;
use crate::reporter::Reporter;

/// Reporter that prints every event as it arrives
pub struct LiveReporter {
    formatter: EventFormatter,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl LiveReporter {
    /// Print to stderr, leaving stdout for the ordered log
    pub fn stderr(formatter: EventFormatter) -> Self {
        Self::to_writer(formatter, io::stderr())
    }

    pub fn to_writer(formatter: EventFormatter, writer: impl Write + Send + 'static) -> Self {
        Self {
            formatter,
            writer: Mutex::new(Box::new(writer)),
        }
    }
}

impl Reporter for LiveReporter {
    fn apply(&self, event: Event) {
        let line = self.formatter.format_event(&event);
        let mut writer = match self.writer.lock() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(writer, "{}", line.trim_end_matches('\n')) {
            warn!("Failed to write live event {}: {}", event.ordinal, e);
        }
    }
}
