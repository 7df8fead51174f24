//! Presentation payload handed to a presenter

use std::time::Duration;

use crate::types::event::EventRecord;

/// Everything a presenter needs to render one alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    /// Meeting title.
    pub title: String,
    /// Opened by the Join button.
    pub join_link: String,
    /// Opened by the Calendar button; empty hides it.
    pub calendar_link: String,
    /// How long the alert stays on screen before giving up.
    pub visibility: Duration,
    /// Application used to open links; the system default when `None`.
    pub browser: Option<String>,
}

impl Alert {
    /// Build an alert for `event` with the given presentation settings.
    #[must_use]
    pub fn for_event(event: &EventRecord, visibility: Duration, browser: Option<String>) -> Self {
        Self {
            title: event.title.clone(),
            join_link: event.join_link.clone(),
            calendar_link: event.calendar_link.clone(),
            visibility,
            browser,
        }
    }
}
