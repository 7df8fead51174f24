//! Normalized calendar event and its deduplication fingerprint

use std::fmt;

use chrono::{DateTime, Duration as TimeDelta, SecondsFormat, Utc};

/// A calendar entry reduced to what the notifier needs.
///
/// `time_until_start` is measured once, when the record is built from a
/// fetched payload. Later staleness checks must consult a clock instead of
/// trusting this value after any delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// Display title, already sanitized for the presentation layer.
    pub title: String,
    /// URL to join the meeting; empty when there is nothing to join.
    pub join_link: String,
    /// URL to view the entry in the calendar UI.
    pub calendar_link: String,
    /// Scheduled start.
    pub start_time: DateTime<Utc>,
    /// Distance from fetch time to `start_time`; negative once started.
    pub time_until_start: TimeDelta,
}

impl EventRecord {
    /// Build a record, measuring `time_until_start` against `now`.
    pub fn new(
        title: impl Into<String>,
        join_link: impl Into<String>,
        calendar_link: impl Into<String>,
        start_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            join_link: join_link.into(),
            calendar_link: calendar_link.into(),
            start_time,
            time_until_start: start_time - now,
        }
    }

    /// True when the record carries an actionable join link.
    #[must_use]
    pub fn has_join_link(&self) -> bool {
        !self.join_link.is_empty()
    }

    /// Deduplication key for this record.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint {
            title: self.title.clone(),
            join_link: self.join_link.clone(),
            calendar_link: self.calendar_link.clone(),
            start_time: self.start_time,
        }
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} at {}", self.title, self.start_time.to_rfc3339())
    }
}

/// Order-sensitive composite key identifying one logical event.
///
/// Two records re-fetched from the same calendar entry in different poll
/// cycles produce equal fingerprints. The start time keeps full precision.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    title: String,
    join_link: String,
    calendar_link: String,
    start_time: DateTime<Utc>,
}

impl Fingerprint {
    /// Start time of the fingerprinted event; entries expire after it.
    #[must_use]
    pub const fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{}::{}::{}",
            self.title,
            self.join_link,
            self.calendar_link,
            self.start_time.to_rfc3339_opts(SecondsFormat::Nanos, true)
        )
    }
}
