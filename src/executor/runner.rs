//! Suite runner
//!
//! Executes a suite plan on one tracker, reporting every step.

use futures::future::{BoxFuture, FutureExt};
use rand::Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::parallel;
use crate::models::{Event, EventKind, Outcome, SuitePlan, TestPlan};
use crate::ordinal::Tracker;
use crate::reporter::Reporter;

/// Runs suites and reports their events
#[derive(Clone)]
pub struct SuiteRunner {
    reporter: Arc<dyn Reporter>,
    permits: Arc<Semaphore>,
    jitter_ms: u64,
}

impl SuiteRunner {
    /// Create a runner allowing `max_concurrent` test bodies at once
    pub fn new(reporter: Arc<dyn Reporter>, max_concurrent: usize) -> Self {
        Self {
            reporter,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            jitter_ms: 0,
        }
    }

    /// Add up to `ms` of random delay to every test body
    pub fn with_jitter_ms(mut self, ms: u64) -> Self {
        self.jitter_ms = ms;
        self
    }

    /// Run a suite and everything nested under it.
    ///
    /// Nested suites of a `parallel` suite each get a tracker forked from
    /// `tracker` and run on their own task; otherwise they share `tracker`.
    pub fn run_suite<'a>(
        &'a self,
        plan: &'a SuitePlan,
        tracker: &'a mut Tracker,
    ) -> BoxFuture<'a, ()> {
        async move {
            debug!(suite = %plan.name, ordinal = ?tracker.peek(), "Starting suite");
            let start = Instant::now();
            self.emit(Event::new(
                tracker.next_ordinal(),
                EventKind::SuiteStarting,
                &plan.name,
            ));

            if let Some(reason) = &plan.abort {
                warn!("Suite {} aborted: {}", plan.name, reason);
                self.emit(
                    Event::new(tracker.next_ordinal(), EventKind::SuiteAborted, &plan.name)
                        .with_message(reason),
                );
                return;
            }

            for test in &plan.tests {
                self.run_test(&plan.name, test, tracker).await;
            }

            if plan.parallel {
                parallel::run_forked(self, &plan.nested, tracker).await;
            } else {
                for nested in &plan.nested {
                    self.run_suite(nested, tracker).await;
                }
            }

            self.emit(
                Event::new(tracker.next_ordinal(), EventKind::SuiteCompleted, &plan.name)
                    .with_duration(start.elapsed().as_millis() as u64),
            );
        }
        .boxed()
    }

    /// Run a single test
    pub async fn run_test(&self, suite: &str, test: &TestPlan, tracker: &mut Tracker) {
        if test.outcome == Outcome::Ignore {
            self.emit(
                Event::new(tracker.next_ordinal(), EventKind::TestIgnored, suite)
                    .with_test(&test.name),
            );
            return;
        }

        self.emit(
            Event::new(tracker.next_ordinal(), EventKind::TestStarting, suite)
                .with_test(&test.name),
        );

        let start = Instant::now();
        {
            let _permit = self.permits.acquire().await.ok();
            let delay = test.duration_ms + self.jitter();
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        let duration_ms = start.elapsed().as_millis() as u64;

        let event = match test.outcome {
            Outcome::Fail => Event::new(tracker.next_ordinal(), EventKind::TestFailed, suite)
                .with_message(test.message.as_deref().unwrap_or("test failed")),
            _ => Event::new(tracker.next_ordinal(), EventKind::TestSucceeded, suite),
        };
        self.emit(event.with_test(&test.name).with_duration(duration_ms));
    }

    fn emit(&self, event: Event) {
        self.reporter.apply(event);
    }

    fn jitter(&self) -> u64 {
        if self.jitter_ms == 0 {
            0
        } else {
            rand::rng().random_range(0..=self.jitter_ms)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::{ChannelReporter, EventLog};

    fn runner() -> (SuiteRunner, tokio::sync::mpsc::UnboundedReceiver<Event>) {
        let (reporter, receiver) = ChannelReporter::channel();
        (SuiteRunner::new(Arc::new(reporter), 2), receiver)
    }

    #[tokio::test]
    async fn test_sequential_suite_events() {
        let (runner, receiver) = runner();
        let plan = SuitePlan::new("Math")
            .with_test(TestPlan::pass("adds", 0))
            .with_test(TestPlan::fail("divides", 0, "nope"))
            .with_test(TestPlan::ignore("later"));

        let mut tracker = Tracker::new();
        runner.run_suite(&plan, &mut tracker).await;
        drop(runner);

        let log = EventLog::drain(receiver).await;
        let kinds: Vec<_> = log.events().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            [
                EventKind::SuiteStarting,
                EventKind::TestStarting,
                EventKind::TestSucceeded,
                EventKind::TestStarting,
                EventKind::TestFailed,
                EventKind::TestIgnored,
                EventKind::SuiteCompleted,
            ]
        );
        assert_eq!(log.events()[4].message.as_deref(), Some("nope"));
        assert!(log.verify().is_ok());
    }

    #[tokio::test]
    async fn test_aborted_suite_skips_body() {
        let (runner, receiver) = runner();
        let plan = SuitePlan::new("Network")
            .aborting("no server")
            .with_test(TestPlan::pass("connects", 0))
            .with_nested(SuitePlan::new("Inner"));

        let mut tracker = Tracker::new();
        runner.run_suite(&plan, &mut tracker).await;
        drop(runner);

        let log = EventLog::drain(receiver).await;
        assert_eq!(log.len(), 2);
        assert_eq!(log.events()[1].kind, EventKind::SuiteAborted);
        assert_eq!(log.events()[1].message.as_deref(), Some("no server"));
    }

    #[tokio::test]
    async fn test_sequential_nested_suites_share_tracker() {
        let (runner, receiver) = runner();
        let plan = SuitePlan::new("Outer")
            .with_nested(SuitePlan::new("A").with_test(TestPlan::pass("a", 0)))
            .with_nested(SuitePlan::new("B").with_test(TestPlan::pass("b", 0)));

        let mut tracker = Tracker::new();
        runner.run_suite(&plan, &mut tracker).await;
        drop(runner);

        let log = EventLog::drain(receiver).await;
        // One flat branch: every ordinal has the baseline depth
        assert!(log.events().iter().all(|e| e.ordinal.depth() == 2));
        assert_eq!(log.events().first().map(|e| e.suite.as_str()), Some("Outer"));
        assert_eq!(log.events().last().map(|e| e.suite.as_str()), Some("Outer"));
    }

    #[test]
    fn test_jitter_bounds() {
        let (runner, _receiver) = runner();
        assert_eq!(runner.jitter(), 0);

        let runner = runner.with_jitter_ms(5);
        for _ in 0..50 {
            assert!(runner.jitter() <= 5);
        }
    }
}
