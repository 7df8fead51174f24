//! Heartbeat monitor
//!
//! Sleeps a fixed period on the monotonic timer and compares how much
//! wall-clock time went by. A host that was suspended mid-sleep shows far
//! more wall-clock time than the period; when that happens every dedup
//! entry is dropped so the next poll can re-arm alerts the user missed.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as TimeDelta, Utc};
use meetbell_domain::HeartbeatConfig;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::notify::cache::DedupCache;
use crate::time::{to_time_delta, Clock};

/// Timing knobs for the heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatSettings {
    /// Length of one monitored sleep.
    pub period: Duration,
    /// Extra wall-clock time tolerated before declaring a skew.
    pub slack: Duration,
}

impl From<&HeartbeatConfig> for HeartbeatSettings {
    fn from(config: &HeartbeatConfig) -> Self {
        Self { period: config.period(), slack: config.slack() }
    }
}

/// Outcome of one heartbeat cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pulse {
    /// Wall-clock time kept pace with the sleep.
    Steady,
    /// The wall clock ran ahead by `skew` beyond the expected wake time.
    Skewed {
        /// How far past the expected wake time the clock read.
        skew: TimeDelta,
    },
}

impl Pulse {
    /// `true` for [`Pulse::Skewed`].
    #[must_use]
    pub const fn is_skewed(&self) -> bool {
        matches!(self, Self::Skewed { .. })
    }
}

/// Detects forward wall-clock jumps and clears the dedup cache on each one.
pub struct HeartbeatMonitor {
    settings: HeartbeatSettings,
    cache: Arc<DedupCache>,
    clock: Arc<dyn Clock>,
}

impl HeartbeatMonitor {
    /// Monitor that clears `cache` whenever `clock` jumps forward.
    pub fn new(settings: HeartbeatSettings, cache: Arc<DedupCache>, clock: Arc<dyn Clock>) -> Self {
        Self { settings, cache, clock }
    }

    /// Classify one cycle that started at `started` and woke at `finished`.
    #[must_use]
    pub fn evaluate(&self, started: DateTime<Utc>, finished: DateTime<Utc>) -> Pulse {
        let period = to_time_delta(self.settings.period);
        let slack = to_time_delta(self.settings.slack);
        let elapsed = finished.signed_duration_since(started);

        let threshold = period.checked_add(&slack).unwrap_or(TimeDelta::MAX);
        if elapsed > threshold {
            let skew = elapsed.checked_sub(&period).unwrap_or(TimeDelta::MAX);
            Pulse::Skewed { skew }
        } else {
            Pulse::Steady
        }
    }

    /// Run a single cycle: sleep one period and clear the cache on skew.
    pub async fn beat(&self) -> Pulse {
        let started = self.clock.now();
        tokio::time::sleep(self.settings.period).await;
        let finished = self.clock.now();

        let pulse = self.evaluate(started, finished);
        match pulse {
            Pulse::Skewed { skew } => {
                let dropped = self.cache.clear();
                warn!(
                    skew_seconds = skew.num_seconds(),
                    dropped,
                    generation = self.cache.generation(),
                    "clock_skew_detected"
                );
            }
            Pulse::Steady => debug!("heartbeat_steady"),
        }
        pulse
    }

    /// Beat until `cancel` fires.
    pub async fn run(&self, cancel: &CancellationToken) {
        info!(
            period_seconds = self.settings.period.as_secs(),
            slack_seconds = self.settings.slack.as_secs(),
            "heartbeat_started"
        );
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = self.beat() => {}
            }
        }
        info!("heartbeat_stopped");
    }

    /// Run on a background task until `cancel` fires.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(&cancel).await })
    }
}
