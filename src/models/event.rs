//! Report event models
//!
//! Defines the events a run emits and their kinds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::ordinal::Ordinal;

/// Kind of reported event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    RunStarting,
    RunCompleted,

    SuiteStarting,
    SuiteCompleted,
    SuiteAborted,

    TestStarting,
    TestSucceeded,
    TestFailed,
    TestIgnored,
}

impl EventKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            EventKind::RunStarting => "▶",
            EventKind::RunCompleted => "■",
            EventKind::SuiteStarting => "┌",
            EventKind::SuiteCompleted => "└",
            EventKind::SuiteAborted => "!",
            EventKind::TestStarting => "·",
            EventKind::TestSucceeded => "✓",
            EventKind::TestFailed => "✗",
            EventKind::TestIgnored => "○",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EventKind::RunStarting => "RunStarting",
            EventKind::RunCompleted => "RunCompleted",
            EventKind::SuiteStarting => "SuiteStarting",
            EventKind::SuiteCompleted => "SuiteCompleted",
            EventKind::SuiteAborted => "SuiteAborted",
            EventKind::TestStarting => "TestStarting",
            EventKind::TestSucceeded => "TestSucceeded",
            EventKind::TestFailed => "TestFailed",
            EventKind::TestIgnored => "TestIgnored",
        }
    }

    /// Terminal event of a test
    pub fn is_test_outcome(&self) -> bool {
        matches!(
            self,
            EventKind::TestSucceeded | EventKind::TestFailed | EventKind::TestIgnored
        )
    }

    /// Terminal event of a suite
    pub fn is_suite_outcome(&self) -> bool {
        matches!(self, EventKind::SuiteCompleted | EventKind::SuiteAborted)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single reported event
///
/// Events order by ordinal only; the wall-clock timestamp and thread label are
/// informational.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Event {
    pub ordinal: Ordinal,
    pub kind: EventKind,
    pub suite: String,
    pub test: Option<String>,
    pub message: Option<String>,
    pub duration_ms: Option<u64>,
    pub thread: String,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    /// Create an event stamped with the current thread and time
    pub fn new(ordinal: Ordinal, kind: EventKind, suite: impl Into<String>) -> Self {
        Self {
            ordinal,
            kind,
            suite: suite.into(),
            test: None,
            message: None,
            duration_ms: None,
            thread: current_thread_label(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_test(mut self, test: impl Into<String>) -> Self {
        self.test = Some(test.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.ordinal == other.ordinal
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordinal.cmp(&other.ordinal)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {}", self.ordinal, self.kind.symbol(), self.suite)?;
        if let Some(test) = &self.test {
            write!(f, " / {test}")?;
        }
        if let Some(ms) = self.duration_ms {
            write!(f, " [{ms}ms]")?;
        }
        if let Some(msg) = &self.message {
            write!(f, " - {msg}")?;
        }
        Ok(())
    }
}

fn current_thread_label() -> String {
    let thread = std::thread::current();
    match thread.name() {
        Some(name) => format!("{name} {:?}", thread.id()),
        None => format!("{:?}", thread.id()),
    }
}
