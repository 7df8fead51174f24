//! Poll loop feeding fetched events into the scheduler

use std::sync::Arc;
use std::time::Duration;

use meetbell_domain::PollingConfig;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::notify::error::PollError;
use crate::notify::ports::EventSource;
use crate::notify::scheduler::Scheduler;

/// Cadence and failure policy of the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Sleep after each successful cycle.
    pub interval: Duration,
    /// Sleep after a failed fetch before retrying.
    pub retry_delay: Duration,
    /// Give up once this many fetches in a row have failed.
    pub max_consecutive_failures: u32,
    /// Stop after this many cycles; 0 runs until cancelled.
    pub loops: u32,
}

impl From<&PollingConfig> for PollSettings {
    fn from(config: &PollingConfig) -> Self {
        Self {
            interval: config.interval(),
            retry_delay: config.retry_delay(),
            max_consecutive_failures: config.max_consecutive_failures.max(1),
            loops: config.loops,
        }
    }
}

/// Totals over a finished poll loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    /// Cycles started, failed fetches included.
    pub cycles: u32,
    /// Alerts armed over all cycles.
    pub armed: usize,
    /// Events left without an alert over all cycles.
    pub suppressed: usize,
    /// Fetches that failed, whether or not a later retry succeeded.
    pub fetch_failures: u32,
}

/// Fetches events on a fixed cadence and schedules each of them.
pub struct PollLoop {
    settings: PollSettings,
    source: Arc<dyn EventSource>,
    scheduler: Arc<Scheduler>,
}

impl PollLoop {
    /// Loop feeding events from `source` into `scheduler`.
    pub fn new(settings: PollSettings, source: Arc<dyn EventSource>, scheduler: Arc<Scheduler>) -> Self {
        Self { settings, source, scheduler }
    }

    /// Poll until the loop limit is reached or `cancel` fires.
    ///
    /// The first fetch happens immediately.
    ///
    /// # Errors
    /// Returns [`PollError::TooManyFailures`] once fetching has failed
    /// `max_consecutive_failures` times in a row.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<PollReport, PollError> {
        let mut report = PollReport::default();
        let mut consecutive_failures = 0_u32;

        loop {
            if cancel.is_cancelled() {
                info!(cycles = report.cycles, "poll_loop_cancelled");
                break;
            }
            if self.limit_reached(&report) {
                info!(cycles = report.cycles, "poll_loop_limit_reached");
                break;
            }

            report.cycles += 1;
            info!(
                cycle = report.cycles,
                consecutive_failures,
                source = self.source.name(),
                "poll_cycle_started"
            );

            let events = match self.source.fetch().await {
                Ok(events) => {
                    consecutive_failures = 0;
                    events
                }
                Err(err) => {
                    consecutive_failures += 1;
                    report.fetch_failures += 1;
                    warn!(
                        failure = consecutive_failures,
                        error = %err,
                        error_type = err.label(),
                        "calendar_fetch_failed"
                    );
                    if consecutive_failures >= self.settings.max_consecutive_failures {
                        return Err(PollError::TooManyFailures {
                            failures: consecutive_failures,
                            last_error: err,
                        });
                    }
                    if self.limit_reached(&report) {
                        continue;
                    }
                    sleep_or_cancel(self.settings.retry_delay, cancel).await;
                    continue;
                }
            };

            let summary = self.scheduler.schedule_all(&events);
            report.armed += summary.armed;
            report.suppressed += summary.suppressed;
            info!(
                cycle = report.cycles,
                fetched = events.len(),
                armed = summary.armed,
                suppressed = summary.suppressed,
                in_flight = self.scheduler.in_flight(),
                "poll_cycle_completed"
            );

            if self.limit_reached(&report) {
                continue;
            }
            sleep_or_cancel(self.settings.interval, cancel).await;
        }

        Ok(report)
    }

    const fn limit_reached(&self, report: &PollReport) -> bool {
        self.settings.loops > 0 && report.cycles >= self.settings.loops
    }
}

/// Sleep for `duration`, returning early if `cancel` fires.
async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) {
    tokio::select! {
        () = cancel.cancelled() => {}
        () = tokio::time::sleep(duration) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_from_config_never_allow_zero_failures() {
        let config = PollingConfig { max_consecutive_failures: 0, ..PollingConfig::default() };
        let settings = PollSettings::from(&config);
        assert_eq!(settings.max_consecutive_failures, 1);
        assert_eq!(settings.interval, Duration::from_secs(600));
        assert_eq!(settings.retry_delay, Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn sleep_or_cancel_returns_on_cancel() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let started = tokio::time::Instant::now();
        sleep_or_cancel(Duration::from_secs(600), &cancel).await;
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
