//! Application context - owns every component of one run

use std::sync::Arc;
use std::time::Duration;

use meetbell_core::{
    Clock, DedupCache, EventSource, HeartbeatMonitor, HeartbeatSettings, NotifierSettings,
    PollError, PollLoop, PollReport, PollSettings, Scheduler, SystemClock,
};
use meetbell_domain::constants::SHUTDOWN_GRACE_SECS;
use meetbell_domain::{expand_path, Config, Result};
use meetbell_infra::{FileEventSource, GoogleCalendarSource, PlatformPresenterFactory};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Shared state for a run: the cache is the one piece both the scheduler
/// and the heartbeat hold.
pub struct AppContext {
    /// Effective configuration, flags and environment applied.
    pub config: Config,
    /// Wall clock shared by every component.
    pub clock: Arc<dyn Clock>,
    /// Dedup cache shared by the scheduler and the heartbeat.
    pub cache: Arc<DedupCache>,
    /// Arms alerts for fetched events.
    pub scheduler: Arc<Scheduler>,
    /// Google Calendar, or the events file when one is configured.
    pub source: Arc<dyn EventSource>,
}

impl AppContext {
    /// Build the context against the system clock.
    ///
    /// # Errors
    /// Fails on invalid configuration, an unusable presenter, or (for the
    /// calendar service) an unknown calendar id.
    pub async fn new(config: Config) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock)).await
    }

    /// Build the context with an explicit clock.
    ///
    /// # Errors
    /// See [`AppContext::new`].
    pub async fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        let cache = Arc::new(DedupCache::new(Arc::clone(&clock)));
        let scheduler = Scheduler::new(
            NotifierSettings::from(&config.notifier),
            Arc::clone(&cache),
            Arc::clone(&clock),
            &PlatformPresenterFactory,
        )?;
        let source = build_source(&config, Arc::clone(&clock)).await?;

        info!(
            presenter = %scheduler.presenter_kind(),
            source = source.name(),
            lead_secs = config.notifier.lead_seconds,
            poll_interval_secs = config.polling.interval_seconds,
            "meetbell_started"
        );

        Ok(Self { config, clock, cache, scheduler: Arc::new(scheduler), source })
    }

    /// Run until the poll loop finishes, gives up, or `cancel` fires.
    ///
    /// The heartbeat runs alongside the poll loop and is stopped with it;
    /// armed alerts then get a short grace period to fire.
    ///
    /// # Errors
    /// Returns the poll loop's error when it gave up.
    pub async fn run(&self, cancel: &CancellationToken) -> std::result::Result<PollReport, PollError> {
        let heartbeat_cancel = cancel.child_token();
        let heartbeat = HeartbeatMonitor::new(
            HeartbeatSettings::from(&self.config.heartbeat),
            Arc::clone(&self.cache),
            Arc::clone(&self.clock),
        )
        .spawn(heartbeat_cancel.clone());

        let poll_loop = PollLoop::new(
            PollSettings::from(&self.config.polling),
            Arc::clone(&self.source),
            Arc::clone(&self.scheduler),
        );
        let outcome = poll_loop.run(cancel).await;

        heartbeat_cancel.cancel();
        if let Err(err) = heartbeat.await {
            warn!(error = %err, "heartbeat_task_failed");
        }
        self.shutdown(Duration::from_secs(SHUTDOWN_GRACE_SECS)).await;

        outcome
    }

    async fn shutdown(&self, grace: Duration) {
        let pending = self.scheduler.in_flight();
        let drained = self.scheduler.drain(grace).await;
        info!(pending, drained, cached = self.cache.len(), "meetbell_stopped");
    }
}

async fn build_source(config: &Config, clock: Arc<dyn Clock>) -> Result<Arc<dyn EventSource>> {
    if let Some(path) = &config.calendar.events_file {
        let path = expand_path(&path.to_string_lossy())?;
        return Ok(Arc::new(FileEventSource::new(path, config.calendar.lookahead(), clock)));
    }

    let source = GoogleCalendarSource::from_config(&config.calendar, clock)?;
    source.verify_calendars().await?;
    Ok(Arc::new(source))
}
