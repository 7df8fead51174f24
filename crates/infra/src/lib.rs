//! # Meetbell Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - Configuration loading (files + environment)
//! - Calendar event sources (Google Calendar, local JSON file)
//! - Alert presenters (AppleScript dialog, log)
//! - HTTP client and error conversions
//! - Logging setup
//!
//! ## Architecture
//! - Implements traits defined in `meetbell-core`
//! - Contains all "impure" code (I/O, processes, network)

pub mod config;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod observability;
pub mod presenters;

// Re-export commonly used items
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder, RetryPolicy};
pub use integrations::calendar::{FileEventSource, GoogleCalendarSource, TokenSource};
pub use presenters::{LogPresenter, OsascriptPresenter, PlatformPresenterFactory};
