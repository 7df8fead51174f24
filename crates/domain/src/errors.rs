//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Meetbell
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum MeetbellError {
    /// Invalid or unusable configuration; fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport failure or unexpected HTTP status.
    #[error("Network error: {0}")]
    Network(String),

    /// Missing, unreadable or rejected credentials.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A payload or timestamp could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The host could not run a platform helper (e.g. `osascript`).
    #[error("Platform error: {0}")]
    Platform(String),

    /// An alert field cannot be shown by the presenter.
    #[error("Render error: {0}")]
    Render(String),

    /// A caller passed an argument outside the accepted range.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Bug or broken invariant.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MeetbellError {
    /// Stable label suitable for structured log fields.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Network(_) => "network",
            Self::Auth(_) => "auth",
            Self::Parse(_) => "parse",
            Self::Platform(_) => "platform",
            Self::Render(_) => "render",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for Meetbell operations
pub type Result<T> = std::result::Result<T, MeetbellError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_category_prefix() {
        let err = MeetbellError::Network("connection reset".into());
        assert_eq!(err.to_string(), "Network error: connection reset");
    }

    #[test]
    fn serializes_as_tagged_enum() {
        let err = MeetbellError::Render("bad quote".into());
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"type":"Render","message":"bad quote"}"#);
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(MeetbellError::Config(String::new()).label(), "config");
        assert_eq!(MeetbellError::InvalidInput(String::new()).label(), "invalid_input");
    }
}
