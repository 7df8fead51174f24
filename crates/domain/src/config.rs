//! Configuration management
//!
//! Every section carries serde defaults so a partial file (or no file at all)
//! yields a runnable configuration. Durations are expressed in whole seconds
//! or minutes, matching the units users type on the command line.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CALENDAR_ID, DEFAULT_CLIENT_TIMEOUT_SECS, DEFAULT_HEARTBEAT_PERIOD_SECS,
    DEFAULT_HEARTBEAT_SLACK_SECS, DEFAULT_LEAD_SECS, DEFAULT_LOG_LEVEL, DEFAULT_LOOKAHEAD_MINUTES,
    DEFAULT_MAX_CONSECUTIVE_FAILURES, DEFAULT_MAX_RESULTS_PER_POLL, DEFAULT_POLL_INTERVAL_SECS,
    DEFAULT_PRESENTER, DEFAULT_RETRY_DELAY_SECS, DEFAULT_STALE_TOLERANCE_SECS, DEFAULT_TOKEN_FILE,
    DEFAULT_VISIBILITY_SECS, GOOGLE_CALENDAR_API_BASE, MAX_RESULTS_PER_POLL_LIMIT,
};
use crate::errors::{MeetbellError, Result};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `[calendar]`
    pub calendar: CalendarConfig,
    /// `[polling]`
    pub polling: PollingConfig,
    /// `[notifier]`
    pub notifier: NotifierConfig,
    /// `[heartbeat]`
    pub heartbeat: HeartbeatConfig,
    /// `[logging]`
    pub logging: LoggingConfig,
}

/// Where and how events are fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Calendars to poll; `primary` is the account's own calendar.
    pub calendar_ids: Vec<String>,
    /// Only events starting within this many minutes are fetched.
    pub lookahead_minutes: u64,
    /// Per-calendar page size, at most 250.
    pub max_results_per_poll: u32,
    /// JSON file holding an `access_token`; supports a `~/` prefix.
    pub token_file: String,
    /// Whole-request HTTP timeout.
    pub client_timeout_seconds: u64,
    /// Calendar API root; overridden in tests.
    pub api_base: String,
    /// When set, events are read from this JSON file instead of the calendar
    /// service.
    pub events_file: Option<PathBuf>,
}

/// Poll loop cadence and failure policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Pause between successful cycles.
    pub interval_seconds: u64,
    /// Failed fetches in a row before the loop gives up.
    pub max_consecutive_failures: u32,
    /// Pause before retrying a failed fetch.
    pub retry_delay_seconds: u64,
    /// Number of poll cycles before stopping; 0 means forever.
    pub loops: u32,
}

/// Alerting behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Presenter binding name, see `PresenterKind`.
    pub presenter: String,
    /// How long before the start an alert is shown.
    pub lead_seconds: u64,
    /// How long an alert stays on screen.
    pub visibility_seconds: u64,
    /// Browser to activate for links; default browser when absent.
    pub browser: Option<String>,
    /// How late past the start an armed alert may still fire.
    pub stale_tolerance_seconds: u64,
}

/// Clock skew detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartbeatConfig {
    /// Sleep between clock readings.
    pub period_seconds: u64,
    /// Lateness tolerated before a wake counts as a clock jump.
    pub slack_seconds: u64,
}

/// Log sink configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file to (over)write; stdout when absent.
    pub file: Option<PathBuf>,
    /// `EnvFilter` directive; `RUST_LOG` wins when set.
    pub level: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_ids: vec![DEFAULT_CALENDAR_ID.to_string()],
            lookahead_minutes: DEFAULT_LOOKAHEAD_MINUTES,
            max_results_per_poll: DEFAULT_MAX_RESULTS_PER_POLL,
            token_file: DEFAULT_TOKEN_FILE.to_string(),
            client_timeout_seconds: DEFAULT_CLIENT_TIMEOUT_SECS,
            api_base: GOOGLE_CALENDAR_API_BASE.to_string(),
            events_file: None,
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_seconds: DEFAULT_POLL_INTERVAL_SECS,
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
            retry_delay_seconds: DEFAULT_RETRY_DELAY_SECS,
            loops: 0,
        }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            presenter: DEFAULT_PRESENTER.to_string(),
            lead_seconds: DEFAULT_LEAD_SECS,
            visibility_seconds: DEFAULT_VISIBILITY_SECS,
            browser: None,
            stale_tolerance_seconds: DEFAULT_STALE_TOLERANCE_SECS,
        }
    }
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            period_seconds: DEFAULT_HEARTBEAT_PERIOD_SECS,
            slack_seconds: DEFAULT_HEARTBEAT_SLACK_SECS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { file: None, level: DEFAULT_LOG_LEVEL.to_string() }
    }
}

impl CalendarConfig {
    /// [`Self::lookahead_minutes`] as a `Duration`.
    #[must_use]
    pub const fn lookahead(&self) -> Duration {
        Duration::from_secs(self.lookahead_minutes * 60)
    }

    /// [`Self::client_timeout_seconds`] as a `Duration`.
    #[must_use]
    pub const fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.client_timeout_seconds)
    }
}

impl PollingConfig {
    /// [`Self::interval_seconds`] as a `Duration`.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    /// [`Self::retry_delay_seconds`] as a `Duration`.
    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_seconds)
    }
}

impl NotifierConfig {
    /// [`Self::lead_seconds`] as a `Duration`.
    #[must_use]
    pub const fn lead_time(&self) -> Duration {
        Duration::from_secs(self.lead_seconds)
    }

    /// [`Self::visibility_seconds`] as a `Duration`.
    #[must_use]
    pub const fn visibility(&self) -> Duration {
        Duration::from_secs(self.visibility_seconds)
    }

    /// [`Self::stale_tolerance_seconds`] as a `Duration`.
    #[must_use]
    pub const fn stale_tolerance(&self) -> Duration {
        Duration::from_secs(self.stale_tolerance_seconds)
    }
}

impl HeartbeatConfig {
    /// [`Self::period_seconds`] as a `Duration`.
    #[must_use]
    pub const fn period(&self) -> Duration {
        Duration::from_secs(self.period_seconds)
    }

    /// [`Self::slack_seconds`] as a `Duration`.
    #[must_use]
    pub const fn slack(&self) -> Duration {
        Duration::from_secs(self.slack_seconds)
    }
}

impl Config {
    /// Check cross-field constraints that serde cannot express.
    ///
    /// # Errors
    /// Returns `MeetbellError::Config` naming the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        if self.calendar.events_file.is_none() && self.calendar.calendar_ids.is_empty() {
            return Err(MeetbellError::Config(
                "there must be at least one calendar to check".into(),
            ));
        }
        if self.calendar.calendar_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(MeetbellError::Config("calendar ids must not be blank".into()));
        }
        if self.calendar.max_results_per_poll == 0
            || self.calendar.max_results_per_poll > MAX_RESULTS_PER_POLL_LIMIT
        {
            return Err(MeetbellError::Config(format!(
                "max_results_per_poll must be between 1 and {MAX_RESULTS_PER_POLL_LIMIT}, got {}",
                self.calendar.max_results_per_poll
            )));
        }
        if self.polling.interval_seconds == 0 {
            return Err(MeetbellError::Config("polling interval must be non-zero".into()));
        }
        if self.polling.max_consecutive_failures == 0 {
            return Err(MeetbellError::Config(
                "max_consecutive_failures must be at least 1".into(),
            ));
        }
        if self.heartbeat.period_seconds == 0 {
            return Err(MeetbellError::Config("heartbeat period must be non-zero".into()));
        }
        if let Some(browser) = &self.notifier.browser {
            if browser.chars().any(|c| c == '"' || c == '\\' || c.is_control()) {
                return Err(MeetbellError::Config(format!(
                    "browser {browser:?} cannot be named in an AppleScript string"
                )));
            }
        }
        Ok(())
    }
}
