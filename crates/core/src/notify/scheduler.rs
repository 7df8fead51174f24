//! Alert scheduler
//!
//! Decides per fetched event whether an alert should be armed and, if so,
//! spawns one delayed delivery task for it. Delivery tasks are tracked only
//! so shutdown can let them finish; they are never cancelled.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use meetbell_domain::{Alert, EventRecord, NotifierConfig, PresenterKind};
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::notify::cache::DedupCache;
use crate::notify::error::{SchedulerError, SchedulerResult};
use crate::notify::ports::{Presenter, PresenterFactory};
use crate::time::{to_time_delta, Clock};

/// Presentation and timing settings for the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifierSettings {
    /// Presenter binding name, e.g. `macos_osascript`.
    pub presenter: String,
    /// How long before the start an alert appears.
    pub lead_time: Duration,
    /// How long an alert stays on screen.
    pub visibility: Duration,
    /// Application used to open links; system default when `None`.
    pub browser: Option<String>,
    /// How late past the start a woken task may still fire.
    pub stale_tolerance: Duration,
}

impl From<&NotifierConfig> for NotifierSettings {
    fn from(config: &NotifierConfig) -> Self {
        Self {
            presenter: config.presenter.clone(),
            lead_time: config.lead_time(),
            visibility: config.visibility(),
            browser: config.browser.clone().filter(|b| !b.trim().is_empty()),
            stale_tolerance: config.stale_tolerance(),
        }
    }
}

/// Why an event did not get an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    /// The event had started when it was fetched.
    AlreadyStarted,
    /// Nothing to join.
    NoJoinLink,
    /// An alert for the same event is already armed.
    Duplicate,
}

impl fmt::Display for SuppressReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AlreadyStarted => "already_started",
            Self::NoJoinLink => "no_join_link",
            Self::Duplicate => "duplicate",
        })
    }
}

/// Result of scheduling one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// A delivery task was spawned and will wake after `wait`.
    Armed {
        /// Delay before the alert is shown; zero fires at once.
        wait: Duration,
    },
    /// No alert for this event in this cycle.
    Suppressed(SuppressReason),
}

impl Decision {
    /// `true` for [`Decision::Armed`].
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        matches!(self, Self::Armed { .. })
    }
}

/// Counts from one [`Scheduler::schedule_all`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleSummary {
    /// Events that got a delivery task.
    pub armed: usize,
    /// Events started, without a join link, or already armed.
    pub suppressed: usize,
}

/// Arms at most one delayed alert per distinct event per cache generation.
pub struct Scheduler {
    settings: NotifierSettings,
    kind: PresenterKind,
    cache: Arc<DedupCache>,
    clock: Arc<dyn Clock>,
    presenter: Arc<dyn Presenter>,
    tracker: TaskTracker,
}

impl Scheduler {
    /// Build a scheduler and its presenter.
    ///
    /// # Errors
    /// Fails when the presenter binding is unknown or not offered by
    /// `factory`, when the visibility is zero, or when the presenter cannot
    /// be built on this host.
    pub fn new(
        settings: NotifierSettings,
        cache: Arc<DedupCache>,
        clock: Arc<dyn Clock>,
        factory: &dyn PresenterFactory,
    ) -> SchedulerResult<Self> {
        let available =
            || -> Vec<String> { factory.available().iter().map(ToString::to_string).collect() };
        let kind = settings
            .presenter
            .parse::<PresenterKind>()
            .ok()
            .filter(|kind| factory.available().contains(kind))
            .ok_or_else(|| SchedulerError::UnknownPresenter {
                name: settings.presenter.clone(),
                available: available(),
            })?;

        if settings.visibility.is_zero() {
            return Err(SchedulerError::InvalidSetting(
                "visibility must be at least one second".into(),
            ));
        }

        let presenter = factory
            .build(kind, &settings)
            .map_err(|source| SchedulerError::PresenterUnavailable { kind, source })?;

        info!(
            presenter = %kind,
            lead_seconds = settings.lead_time.as_secs(),
            stale_tolerance_seconds = settings.stale_tolerance.as_secs(),
            "scheduler_created"
        );

        Ok(Self { settings, kind, cache, clock, presenter, tracker: TaskTracker::new() })
    }

    /// Presenter binding in use.
    #[must_use]
    pub const fn presenter_kind(&self) -> PresenterKind {
        self.kind
    }

    /// Decide whether `event` gets an alert and arm it if so.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self, event: &EventRecord) -> Decision {
        self.cache.weed();

        let decision = self.evaluate(event);
        match decision {
            Decision::Armed { wait } => {
                info!(event = %event, wait_seconds = wait.as_secs(), "alert_armed");
                self.arm(event, wait);
            }
            Decision::Suppressed(reason) => {
                debug!(event = %event, reason = %reason, "alert_suppressed");
            }
        }
        decision
    }

    /// Schedule every event in order.
    pub fn schedule_all(&self, events: &[EventRecord]) -> ScheduleSummary {
        events.iter().fold(ScheduleSummary::default(), |mut summary, event| {
            if self.schedule(event).is_armed() {
                summary.armed += 1;
            } else {
                summary.suppressed += 1;
            }
            summary
        })
    }

    /// Stop accepting new tasks and wait up to `timeout` for armed ones.
    ///
    /// Returns `true` when every task finished in time.
    pub async fn drain(&self, timeout: Duration) -> bool {
        self.tracker.close();
        let pending = self.tracker.len();
        let finished = tokio::time::timeout(timeout, self.tracker.wait()).await.is_ok();
        if !finished {
            warn!(pending, timeout_ms = timeout.as_millis(), "scheduler_drain_timed_out");
        }
        finished
    }

    /// Number of armed tasks that have not finished.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    fn evaluate(&self, event: &EventRecord) -> Decision {
        if event.time_until_start < chrono::Duration::zero() {
            return Decision::Suppressed(SuppressReason::AlreadyStarted);
        }
        if !event.has_join_link() {
            return Decision::Suppressed(SuppressReason::NoJoinLink);
        }
        if self.cache.lookup(event) {
            return Decision::Suppressed(SuppressReason::Duplicate);
        }
        // inside the lead window already: fire now
        let wait = (event.time_until_start - to_time_delta(self.settings.lead_time))
            .to_std()
            .unwrap_or(Duration::ZERO);
        Decision::Armed { wait }
    }

    fn arm(&self, event: &EventRecord, wait: Duration) {
        let delivery = Delivery {
            alert: Alert::for_event(event, self.settings.visibility, self.settings.browser.clone()),
            label: event.to_string(),
            event: event.clone(),
            generation: self.cache.generation(),
            cache: Arc::clone(&self.cache),
            stale_tolerance: self.settings.stale_tolerance,
            clock: Arc::clone(&self.clock),
            presenter: Arc::clone(&self.presenter),
        };
        self.tracker.spawn(delivery.run(wait));
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("settings", &self.settings)
            .field("kind", &self.kind)
            .field("in_flight", &self.tracker.len())
            .finish_non_exhaustive()
    }
}

/// One armed alert waiting for its moment.
struct Delivery {
    alert: Alert,
    label: String,
    event: EventRecord,
    /// Cache generation at arm time.
    generation: u64,
    cache: Arc<DedupCache>,
    stale_tolerance: Duration,
    clock: Arc<dyn Clock>,
    presenter: Arc<dyn Presenter>,
}

impl Delivery {
    async fn run(self, wait: Duration) {
        tokio::time::sleep(wait).await;

        let deadline = self
            .event
            .start_time
            .checked_add_signed(to_time_delta(self.stale_tolerance))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let now = self.clock.now();
        if now > deadline {
            info!(
                event = %self.label,
                late_seconds = (now - self.event.start_time).num_seconds(),
                "alert_abandoned_stale"
            );
            return;
        }

        // After a clear the event may have been armed again by a newer poll;
        // whichever task records it first in the new generation delivers.
        if self.cache.generation() != self.generation && self.cache.lookup(&self.event) {
            info!(
                event = %self.label,
                armed_generation = self.generation,
                generation = self.cache.generation(),
                "alert_abandoned_superseded"
            );
            return;
        }

        match self.presenter.present(&self.alert).await {
            Ok(()) => info!(event = %self.label, presenter = %self.presenter.kind(), "alert_presented"),
            Err(err) => warn!(
                event = %self.label,
                presenter = %self.presenter.kind(),
                error = %err,
                error_type = err.label(),
                "alert_presentation_failed"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::TimeZone;
    use meetbell_domain::Result;

    use super::*;
    use crate::time::ManualClock;

    struct NullPresenter;

    #[async_trait]
    impl Presenter for NullPresenter {
        async fn present(&self, _alert: &Alert) -> Result<()> {
            Ok(())
        }

        fn kind(&self) -> PresenterKind {
            PresenterKind::Log
        }
    }

    struct LogOnly;

    impl PresenterFactory for LogOnly {
        fn available(&self) -> &[PresenterKind] {
            &[PresenterKind::Log]
        }

        fn build(&self, _kind: PresenterKind, _settings: &NotifierSettings) -> Result<Arc<dyn Presenter>> {
            Ok(Arc::new(NullPresenter))
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn settings(presenter: &str) -> NotifierSettings {
        NotifierSettings {
            presenter: presenter.into(),
            lead_time: Duration::from_secs(60),
            visibility: Duration::from_secs(120),
            browser: None,
            stale_tolerance: Duration::from_secs(60),
        }
    }

    fn scheduler() -> Scheduler {
        scheduler_with_cache().0
    }

    fn scheduler_with_cache() -> (Scheduler, Arc<DedupCache>) {
        let clock = Arc::new(ManualClock::new(at(0)));
        let cache = Arc::new(DedupCache::new(clock.clone()));
        let scheduler = Scheduler::new(settings("log"), Arc::clone(&cache), clock, &LogOnly).unwrap();
        (scheduler, cache)
    }

    #[tokio::test]
    async fn started_event_is_suppressed_even_with_link() {
        let scheduler = scheduler();
        let event = EventRecord::new("Late", "https://x", "", at(-5), at(0));
        assert_eq!(scheduler.schedule(&event), Decision::Suppressed(SuppressReason::AlreadyStarted));
    }

    #[tokio::test]
    async fn missing_link_wins_over_cache_state() {
        let scheduler = scheduler();
        let event = EventRecord::new("No link", "", "", at(300), at(0));
        assert_eq!(scheduler.schedule(&event), Decision::Suppressed(SuppressReason::NoJoinLink));
        assert_eq!(scheduler.schedule(&event), Decision::Suppressed(SuppressReason::NoJoinLink));
    }

    #[tokio::test]
    async fn missing_link_wins_over_a_recorded_fingerprint() {
        let (scheduler, cache) = scheduler_with_cache();
        let event = EventRecord::new("No link", "", "", at(300), at(0));
        assert!(!cache.lookup(&event));

        assert_eq!(scheduler.schedule(&event), Decision::Suppressed(SuppressReason::NoJoinLink));
    }

    #[tokio::test]
    async fn only_armed_events_are_recorded() {
        let (scheduler, cache) = scheduler_with_cache();
        scheduler.schedule(&EventRecord::new("Late", "https://x", "", at(-5), at(0)));
        scheduler.schedule(&EventRecord::new("No link", "", "", at(300), at(0)));
        assert_eq!(cache.len(), 0);

        scheduler.schedule(&EventRecord::new("Standup", "https://x", "", at(300), at(0)));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn wait_is_time_until_start_minus_lead() {
        let scheduler = scheduler();
        let event = EventRecord::new("Standup", "https://x", "", at(65), at(0));
        assert_eq!(scheduler.schedule(&event), Decision::Armed { wait: Duration::from_secs(5) });
    }

    #[tokio::test]
    async fn inside_lead_window_fires_immediately() {
        let scheduler = scheduler();
        let event = EventRecord::new("Soon", "https://x", "", at(20), at(0));
        assert_eq!(scheduler.schedule(&event), Decision::Armed { wait: Duration::ZERO });
    }

    #[tokio::test]
    async fn schedule_all_counts_outcomes() {
        let scheduler = scheduler();
        let events = vec![
            EventRecord::new("A", "https://a", "", at(100), at(0)),
            EventRecord::new("A", "https://a", "", at(100), at(0)),
            EventRecord::new("B", "", "", at(100), at(0)),
            EventRecord::new("C", "https://c", "", at(200), at(0)),
        ];
        let summary = scheduler.schedule_all(&events);
        assert_eq!(summary, ScheduleSummary { armed: 2, suppressed: 2 });
    }

    #[test]
    fn unknown_binding_fails_construction() {
        let clock = Arc::new(ManualClock::new(at(0)));
        let cache = Arc::new(DedupCache::new(clock.clone()));
        let err = Scheduler::new(settings("carrier_pigeon"), cache, clock, &LogOnly).unwrap_err();
        match err {
            SchedulerError::UnknownPresenter { name, available } => {
                assert_eq!(name, "carrier_pigeon");
                assert_eq!(available, vec!["log".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn binding_not_offered_by_factory_is_unknown() {
        let clock = Arc::new(ManualClock::new(at(0)));
        let cache = Arc::new(DedupCache::new(clock.clone()));
        let err = Scheduler::new(settings("macos_osascript"), cache, clock, &LogOnly).unwrap_err();
        assert!(matches!(err, SchedulerError::UnknownPresenter { .. }));
    }

    #[test]
    fn zero_visibility_is_rejected() {
        let clock = Arc::new(ManualClock::new(at(0)));
        let cache = Arc::new(DedupCache::new(clock.clone()));
        let mut settings = settings("log");
        settings.visibility = Duration::ZERO;
        let err = Scheduler::new(settings, cache, clock, &LogOnly).unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidSetting(_)));
    }

    #[test]
    fn blank_browser_means_default() {
        let config = NotifierConfig { browser: Some("  ".into()), ..NotifierConfig::default() };
        assert_eq!(NotifierSettings::from(&config).browser, None);
    }
}
