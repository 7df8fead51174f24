//! Shared test helpers for `meetbell-core` integration tests.
//!
//! Lightweight presenters, event sources and fixtures so the scenario tests
//! can focus on scheduling behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod presenters;
pub mod sources;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use meetbell_core::{DedupCache, ManualClock, NotifierSettings, Scheduler};
use meetbell_domain::EventRecord;

use self::presenters::{RecordingPresenter, StaticFactory};

/// Fixed instant all scenarios start from.
pub fn epoch() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

/// `epoch() + secs`.
pub fn at(secs: i64) -> DateTime<Utc> {
    epoch() + chrono::Duration::seconds(secs)
}

/// A meeting starting `start` seconds after the epoch, fetched at `fetched`.
pub fn meeting(title: &str, start: i64, fetched: i64) -> EventRecord {
    EventRecord::new(
        title,
        "https://x",
        "https://calendar.google.com/event?eid=1",
        at(start),
        at(fetched),
    )
}

/// Notifier settings with a 60s lead and the given stale tolerance.
pub fn notifier_settings(stale_tolerance: Duration) -> NotifierSettings {
    NotifierSettings {
        presenter: "log".into(),
        lead_time: Duration::from_secs(60),
        visibility: Duration::from_secs(120),
        browser: None,
        stale_tolerance,
    }
}

/// Everything a scheduling scenario needs, wired together.
pub struct Harness {
    pub clock: ManualClock,
    pub cache: Arc<DedupCache>,
    pub presenter: Arc<RecordingPresenter>,
    pub scheduler: Arc<Scheduler>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_presenter(RecordingPresenter::new())
    }

    pub fn with_presenter(presenter: RecordingPresenter) -> Self {
        let clock = ManualClock::new(epoch());
        let cache = Arc::new(DedupCache::new(Arc::new(clock.clone())));
        let presenter = Arc::new(presenter);
        let factory = StaticFactory::new(presenter.clone());
        let scheduler = Scheduler::new(
            notifier_settings(Duration::from_secs(60)),
            Arc::clone(&cache),
            Arc::new(clock.clone()),
            &factory,
        )
        .expect("scheduler should build with the log binding");

        Self { clock, cache, presenter, scheduler: Arc::new(scheduler) }
    }
}
