//! Fixed-interval scheduling of a repeatable job.

use async_trait::async_trait;
use std::fmt::Display;
use std::time::Duration;
use tracing::{error, info};

/// A unit of work the scheduler repeats.
#[async_trait]
pub trait Job: Send + Sync {
    type Output: Send;
    type Error: Display + Send;

    async fn run_once(&self) -> Result<Self::Output, Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScheduleSummary {
    pub runs: usize,
    pub failures: usize,
}

impl ScheduleSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failures == 0
    }
}

/// Runs a job immediately, then once per `interval`.
///
/// Without `max_runs` the schedule never ends on its own; callers stop it by
/// dropping the future (for example when Ctrl-C wins a `select!`).
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    interval: Duration,
    max_runs: Option<usize>,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_runs: None,
        }
    }

    /// Convert a delay in minutes. Negative or NaN values become zero;
    /// delays too large for a `Duration` saturate to `Duration::MAX`.
    pub fn from_minutes(minutes: f64) -> Self {
        if minutes.is_nan() || minutes <= 0.0 {
            return Self::new(Duration::ZERO);
        }
        let interval = Duration::try_from_secs_f64(minutes * 60.0).unwrap_or(Duration::MAX);
        Self::new(interval)
    }

    pub fn with_max_runs(mut self, max_runs: Option<usize>) -> Self {
        self.max_runs = max_runs;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_runs(&self) -> Option<usize> {
        self.max_runs
    }

    /// Run until `max_runs` is reached, passing every result to `report`.
    pub async fn run<J, F>(&self, job: &J, mut report: F) -> ScheduleSummary
    where
        J: Job,
        F: FnMut(usize, &Result<J::Output, J::Error>),
    {
        let mut summary = ScheduleSummary::default();
        loop {
            summary.runs += 1;
            let run = summary.runs;
            info!(run, "Starting scheduled run");
            let result = job.run_once().await;
            match &result {
                Ok(_) => info!(run, "Scheduled run finished"),
                Err(err) => {
                    summary.failures += 1;
                    error!(run, error = %err, "Scheduled run failed");
                }
            }
            report(run, &result);

            if self.max_runs.is_some_and(|max| summary.runs >= max) {
                return summary;
            }
            info!(
                minutes = self.interval.as_secs_f64() / 60.0,
                "Waiting for next run"
            );
            tokio::time::sleep(self.interval).await;
        }
    }
}
