//! Ordered event log
//!
//! Collects events from every thread of a run and sorts them by ordinal.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::models::{Event, EventKind};
use crate::ordinal::Ordinal;

/// Consistency violations found in a sorted log
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("Ordinal {0} was issued more than once")]
    DuplicateOrdinal(Ordinal),

    #[error("{kind} for '{subject}' at {outcome} sorts before its start at {start}")]
    OutOfOrder {
        kind: EventKind,
        subject: String,
        start: Ordinal,
        outcome: Ordinal,
    },

    #[error("{kind} for '{subject}' at {outcome} has no matching start")]
    MissingStart {
        kind: EventKind,
        subject: String,
        outcome: Ordinal,
    },
}

/// Events of one run in ordinal order
#[derive(Clone, Debug, Default, Serialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn from_events(mut events: Vec<Event>) -> Self {
        events.sort();
        Self { events }
    }

    /// Collect until every sender has been dropped
    pub async fn drain(mut receiver: mpsc::UnboundedReceiver<Event>) -> Self {
        let mut events = Vec::new();
        while let Some(event) = receiver.recv().await {
            events.push(event);
        }
        Self::from_events(events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Check that ordinals are unique and every outcome follows its start.
    ///
    /// Ignored tests are never started, so `TestIgnored` needs no start.
    pub fn verify(&self) -> Result<(), ReportError> {
        for pair in self.events.windows(2) {
            if pair[0].ordinal == pair[1].ordinal {
                return Err(ReportError::DuplicateOrdinal(pair[0].ordinal.clone()));
            }
        }

        // Keyed by run stamp as well, so logs merged from several rounds verify
        let mut suite_starts: HashMap<(u64, &str), &Ordinal> = HashMap::new();
        let mut test_starts: HashMap<(u64, &str, &str), &Ordinal> = HashMap::new();
        for event in &self.events {
            let run = event.ordinal.run_stamp();
            match event.kind {
                EventKind::SuiteStarting => {
                    suite_starts.insert((run, event.suite.as_str()), &event.ordinal);
                }
                EventKind::TestStarting => {
                    if let Some(test) = &event.test {
                        test_starts.insert((run, event.suite.as_str(), test.as_str()), &event.ordinal);
                    }
                }
                _ => {}
            }
        }

        for event in &self.events {
            let run = event.ordinal.run_stamp();
            let (start, subject) = if event.kind.is_suite_outcome() {
                (
                    suite_starts.get(&(run, event.suite.as_str())),
                    event.suite.clone(),
                )
            } else if event.kind.is_test_outcome() && event.kind != EventKind::TestIgnored {
                let test = event.test.as_deref().unwrap_or("");
                (
                    test_starts.get(&(run, event.suite.as_str(), test)),
                    format!("{}/{}", event.suite, test),
                )
            } else {
                continue;
            };

            match start {
                None => {
                    return Err(ReportError::MissingStart {
                        kind: event.kind,
                        subject,
                        outcome: event.ordinal.clone(),
                    })
                }
                Some(start) if **start >= event.ordinal => {
                    return Err(ReportError::OutOfOrder {
                        kind: event.kind,
                        subject,
                        start: (*start).clone(),
                        outcome: event.ordinal.clone(),
                    })
                }
                Some(_) => {}
            }
        }

        Ok(())
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary::from_events(&self.events)
    }
}

/// Counts over a run
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub events: usize,
    pub suites_completed: usize,
    pub suites_aborted: usize,
    pub tests_succeeded: usize,
    pub tests_failed: usize,
    pub tests_ignored: usize,
    pub total_duration_ms: u64,
    pub threads: usize,
}

impl RunSummary {
    pub fn from_events(events: &[Event]) -> Self {
        let count = |kind: EventKind| events.iter().filter(|e| e.kind == kind).count();
        let total_duration_ms = events
            .iter()
            .filter(|e| e.kind.is_test_outcome())
            .filter_map(|e| e.duration_ms)
            .sum();
        let threads = events
            .iter()
            .map(|e| e.thread.as_str())
            .collect::<HashSet<_>>()
            .len();

        Self {
            events: events.len(),
            suites_completed: count(EventKind::SuiteCompleted),
            suites_aborted: count(EventKind::SuiteAborted),
            tests_succeeded: count(EventKind::TestSucceeded),
            tests_failed: count(EventKind::TestFailed),
            tests_ignored: count(EventKind::TestIgnored),
            total_duration_ms,
            threads,
        }
    }

    pub fn tests_run(&self) -> usize {
        self.tests_succeeded + self.tests_failed
    }

    pub fn pass_rate(&self) -> f64 {
        if self.tests_run() == 0 {
            0.0
        } else {
            (self.tests_succeeded as f64 / self.tests_run() as f64) * 100.0
        }
    }

    pub fn is_all_passed(&self) -> bool {
        self.tests_failed == 0 && self.suites_aborted == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Suites: {} completed | {} aborted",
            self.suites_completed, self.suites_aborted
        )?;
        writeln!(
            f,
            "Tests: {} succeeded | {} failed | {} ignored",
            self.tests_succeeded, self.tests_failed, self.tests_ignored
        )?;
        write!(
            f,
            "Pass Rate: {:.1}% | Duration: {}ms | Events: {} from {} thread(s)",
            self.pass_rate(),
            self.total_duration_ms,
            self.events,
            self.threads
        )
    }
}
