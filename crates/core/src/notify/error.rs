//! Scheduler and poll loop error types

use meetbell_domain::{MeetbellError, PresenterKind};
use thiserror::Error;

/// Errors raised while constructing a [`Scheduler`](crate::Scheduler)
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The configured presenter binding does not exist
    #[error("no such notification type {name:?}, choose one of {available:?}")]
    UnknownPresenter {
        /// Name as configured.
        name: String,
        /// Names the factory can build.
        available: Vec<String>,
    },

    /// A setting is out of range
    #[error("invalid scheduler setting: {0}")]
    InvalidSetting(String),

    /// The presenter exists but could not be set up
    #[error("presenter {kind} unavailable: {source}")]
    PresenterUnavailable {
        /// Binding that failed.
        kind: PresenterKind,
        /// Why the factory refused.
        #[source]
        source: MeetbellError,
    },
}

impl From<SchedulerError> for MeetbellError {
    fn from(err: SchedulerError) -> Self {
        match err {
            SchedulerError::PresenterUnavailable { .. } => Self::Platform(err.to_string()),
            _ => Self::Config(err.to_string()),
        }
    }
}

/// Convenience type alias for scheduler construction
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Errors that end the poll loop
#[derive(Debug, Error)]
pub enum PollError {
    /// Fetching kept failing
    #[error("{failures} consecutive polling errors, giving up: {last_error}")]
    TooManyFailures {
        /// Failures in a row, the last one included.
        failures: u32,
        /// Error from the final attempt.
        last_error: MeetbellError,
    },
}

impl From<PollError> for MeetbellError {
    fn from(err: PollError) -> Self {
        match err {
            PollError::TooManyFailures { ref last_error, .. } => match last_error {
                Self::Auth(_) => Self::Auth(err.to_string()),
                _ => Self::Network(err.to_string()),
            },
        }
    }
}
