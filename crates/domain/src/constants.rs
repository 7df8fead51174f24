//! Application constants
//!
//! Centralized location for domain-level defaults used throughout the
//! application.

// Calendar polling

/// Calendar polled when none is configured.
pub const DEFAULT_CALENDAR_ID: &str = "primary";
/// Fetch horizon in minutes.
pub const DEFAULT_LOOKAHEAD_MINUTES: u64 = 60;
/// Events requested per calendar and poll.
pub const DEFAULT_MAX_RESULTS_PER_POLL: u32 = 50;
/// Largest page size the calendar API accepts here.
pub const MAX_RESULTS_PER_POLL_LIMIT: u32 = 250;
/// HTTP request timeout in seconds.
pub const DEFAULT_CLIENT_TIMEOUT_SECS: u64 = 30;
/// OAuth token file holding `access_token`.
pub const DEFAULT_TOKEN_FILE: &str = "~/.meetbell/token.json";
/// Google Calendar v3 REST root.
pub const GOOGLE_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

// Poll loop

/// Seconds between successful polls.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 600;
/// Failed polls in a row before giving up.
pub const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 10;
/// Seconds before retrying a failed poll.
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 5;

// Notifier

/// Presenter binding used when none is configured.
pub const DEFAULT_PRESENTER: &str = "macos_osascript";
/// Seconds before the start an alert is shown.
pub const DEFAULT_LEAD_SECS: u64 = 60;
/// Seconds an alert stays on screen.
pub const DEFAULT_VISIBILITY_SECS: u64 = 120;
/// Seconds past the start an alert may still fire.
pub const DEFAULT_STALE_TOLERANCE_SECS: u64 = 60;

// Heartbeat

/// Seconds between heartbeat clock readings.
pub const DEFAULT_HEARTBEAT_PERIOD_SECS: u64 = 10;
/// Tolerated heartbeat lateness in seconds.
pub const DEFAULT_HEARTBEAT_SLACK_SECS: u64 = 1;

// Logging

/// Log level when neither config nor `RUST_LOG` sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Shutdown

/// Seconds armed alerts get to fire after the poll loop ends.
pub const SHUTDOWN_GRACE_SECS: u64 = 1;
