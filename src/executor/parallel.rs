//! Parallel suite execution
//!
//! Runs nested suites on their own tasks, each reporting through a tracker
//! forked from the parent, and assembles the ordered log of a run.

use anyhow::{bail, Result};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::SuiteRunner;
use crate::models::{Event, EventKind, SuitePlan};
use crate::ordinal::Tracker;
use crate::reporter::{ChannelReporter, Dispatch, EventLog, Reporter};

/// Run `suites` concurrently, one forked tracker per suite.
///
/// Trackers are forked in plan order before any task starts, so the relative
/// order of the suites' events is fixed regardless of scheduling.
pub(crate) async fn run_forked(runner: &SuiteRunner, suites: &[SuitePlan], tracker: &mut Tracker) {
    let mut handles = Vec::with_capacity(suites.len());

    for suite in suites {
        let forked = tracker.next_tracker();
        debug!(suite = %suite.name, baseline = ?forked.peek(), "Forking suite onto new task");

        let runner = runner.clone();
        let suite = suite.clone();
        handles.push(tokio::spawn(async move {
            let mut tracker = forked;
            runner.run_suite(&suite, &mut tracker).await;
        }));
    }

    for (result, suite) in join_all(handles).await.into_iter().zip(suites) {
        if let Err(e) = result {
            warn!("Suite {} did not finish: {}", suite.name, e);
        }
    }
}

/// Parallel run executor
pub struct ParallelExecutor {
    max_concurrent: usize,
    jitter_ms: u64,
    run_stamp: u64,
    reporters: Dispatch,
}

impl ParallelExecutor {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            max_concurrent,
            jitter_ms: 0,
            run_stamp: 0,
            reporters: Dispatch::new(),
        }
    }

    pub fn with_jitter_ms(mut self, ms: u64) -> Self {
        self.jitter_ms = ms;
        self
    }

    pub fn with_run_stamp(mut self, run_stamp: u64) -> Self {
        self.run_stamp = run_stamp;
        self
    }

    /// Also send every event to `reporter` as it happens
    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporters = self.reporters.with(reporter);
        self
    }

    /// Execute a plan and return its events in ordinal order
    pub async fn run(&self, plan: &SuitePlan) -> Result<EventLog> {
        self.run_stamped(plan, self.run_stamp).await
    }

    /// Execute a plan `rounds` times, one run stamp per round
    pub async fn run_rounds(&self, plan: &SuitePlan, rounds: u32) -> Result<Vec<EventLog>> {
        // Every round's stamp must be representable before the first one runs
        if rounds > 0 {
            let last_round = u64::from(rounds - 1);
            if self.run_stamp.checked_add(last_round).is_none() {
                bail!(
                    "Run stamp {} with {} rounds exceeds the largest run stamp {}",
                    self.run_stamp,
                    rounds,
                    u64::MAX
                );
            }
        }

        info!("Running {} rounds of {}", rounds, plan.name);

        let mut logs = Vec::new();
        for round in 0..rounds {
            info!("=== Round {}/{} ===", round + 1, rounds);
            logs.push(self.run_stamped(plan, self.run_stamp + u64::from(round)).await?);
        }
        Ok(logs)
    }

    async fn run_stamped(&self, plan: &SuitePlan, run_stamp: u64) -> Result<EventLog> {
        plan.validate()?;

        info!(
            "Running {} ({} suites, {} tests, max {} concurrent, run stamp {})",
            plan.name,
            plan.suite_count(),
            plan.test_count(),
            self.max_concurrent,
            run_stamp
        );

        let start = Instant::now();
        let (channel, receiver) = ChannelReporter::channel();
        let reporter: Arc<dyn Reporter> = Arc::new(self.reporters.clone().with(channel));
        let runner =
            SuiteRunner::new(reporter.clone(), self.max_concurrent).with_jitter_ms(self.jitter_ms);

        let mut tracker = Tracker::with_run_stamp(run_stamp);
        reporter.apply(Event::new(
            tracker.next_ordinal(),
            EventKind::RunStarting,
            &plan.name,
        ));

        runner.run_suite(plan, &mut tracker).await;

        reporter.apply(
            Event::new(tracker.next_ordinal(), EventKind::RunCompleted, &plan.name)
                .with_duration(start.elapsed().as_millis() as u64),
        );

        // The channel closes once the last sender is gone
        drop(runner);
        drop(reporter);
        let log = EventLog::drain(receiver).await;

        let summary = log.summary();
        info!(
            "Run completed in {}ms - {} events, Pass: {}/{} ({:.1}%)",
            start.elapsed().as_millis(),
            log.len(),
            summary.tests_succeeded,
            summary.tests_run(),
            summary.pass_rate()
        );

        Ok(log)
    }
}

impl Default for ParallelExecutor {
    fn default() -> Self {
        Self::new(4)
    }
}
