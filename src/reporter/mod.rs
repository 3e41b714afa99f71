//! Event reporters
//!
//! Runners push events into a [`Reporter`] from whichever thread they run on.
//! Nothing here assigns order; events arrive already tagged with ordinals and
//! [`EventLog`] sorts them afterwards.

mod log;

pub use log::{EventLog, ReportError, RunSummary};

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::models::Event;

/// Sink for reported events
pub trait Reporter: Send + Sync {
    fn apply(&self, event: Event);
}

/// Forwards events over an unbounded channel
#[derive(Clone, Debug)]
pub struct ChannelReporter {
    sender: mpsc::UnboundedSender<Event>,
}

impl ChannelReporter {
    /// Create a reporter and the receiving end to drain with [`EventLog::drain`]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Reporter for ChannelReporter {
    fn apply(&self, event: Event) {
        if let Err(e) = self.sender.send(event) {
            warn!("Dropped event {}: receiver closed", e.0.ordinal);
        }
    }
}

/// Logs every event at debug level
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn apply(&self, event: Event) {
        debug!(
            ordinal = %event.ordinal,
            kind = %event.kind,
            suite = %event.suite,
            test = event.test.as_deref().unwrap_or(""),
            thread = %event.thread,
            "Event reported"
        );
    }
}

/// Fans each event out to several reporters
#[derive(Clone, Default)]
pub struct Dispatch {
    reporters: Vec<Arc<dyn Reporter>>,
}

impl Dispatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporters.push(Arc::new(reporter));
        self
    }

    pub fn len(&self) -> usize {
        self.reporters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reporters.is_empty()
    }
}

impl Reporter for Dispatch {
    fn apply(&self, event: Event) {
        if let Some((last, rest)) = self.reporters.split_last() {
            for reporter in rest {
                reporter.apply(event.clone());
            }
            last.apply(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventKind;
    use crate::ordinal::Tracker;

    #[test]
    fn test_channel_reporter_delivers() {
        let (reporter, mut receiver) = ChannelReporter::channel();
        let mut tracker = Tracker::new();

        reporter.apply(Event::new(tracker.next_ordinal(), EventKind::RunStarting, "run"));
        reporter.apply(Event::new(tracker.next_ordinal(), EventKind::RunCompleted, "run"));

        let first = receiver.try_recv().unwrap();
        let second = receiver.try_recv().unwrap();
        assert_eq!(first.kind, EventKind::RunStarting);
        assert!(first < second);
    }

    #[test]
    fn test_channel_reporter_survives_closed_receiver() {
        let (reporter, receiver) = ChannelReporter::channel();
        drop(receiver);
        reporter.apply(Event::new(Tracker::new().next_ordinal(), EventKind::RunStarting, "run"));
    }

    #[test]
    fn test_dispatch_fans_out() {
        let (first, mut first_rx) = ChannelReporter::channel();
        let (second, mut second_rx) = ChannelReporter::channel();
        let dispatch = Dispatch::new()
            .with(first)
            .with(second)
            .with(TracingReporter);
        assert_eq!(dispatch.len(), 3);

        dispatch.apply(Event::new(Tracker::new().next_ordinal(), EventKind::SuiteStarting, "S"));

        assert_eq!(first_rx.try_recv().unwrap().suite, "S");
        assert_eq!(second_rx.try_recv().unwrap().suite, "S");
    }

    #[test]
    fn test_empty_dispatch_is_noop() {
        let dispatch = Dispatch::new();
        assert!(dispatch.is_empty());
        dispatch.apply(Event::new(Tracker::new().next_ordinal(), EventKind::SuiteStarting, "S"));
    }
}
