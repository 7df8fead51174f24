//! Google Calendar payload → [`EventRecord`]

use chrono::{DateTime, NaiveDate, Utc};
use meetbell_domain::{sanitize_title, EventRecord, MeetbellError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

/// Links to hosts we know how to join, as found in `href` attributes.
static JOIN_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"href="(https://(?:[a-z0-9-]+\.)*(?:meet\.google\.com|liveplayer\.corp\.google\.com|zoom\.us|teams\.microsoft\.com|teams\.live\.com|webex\.com)/[^"]*)""#,
    )
    .unwrap_or_else(|_| unreachable!("join link pattern is a valid regex"))
});

/// One entry of a Google Calendar `events.list` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEvent {
    #[serde(default)]
    /// Event id, unique within its calendar.
    pub id: String,
    /// Title; absent on untitled events.
    #[serde(default)]
    pub summary: String,
    /// Free-text body, scanned for join links.
    #[serde(default)]
    pub description: String,
    /// Event page in the calendar web UI.
    #[serde(default)]
    pub html_link: String,
    /// Meet link attached by the API.
    #[serde(default)]
    pub hangout_link: String,
    /// Scheduled start.
    pub start: Option<EventDateTime>,
    /// Start of the series occurrence a moved instance replaces.
    pub original_start_time: Option<EventDateTime>,
}

/// Either a timed start (`dateTime`) or an all-day start (`date`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    /// RFC 3339 instant for timed events.
    #[serde(default)]
    pub date_time: String,
    /// Calendar date for all-day events.
    #[serde(default)]
    pub date: String,
}

/// Convert a raw event into a record measured against `now`.
///
/// # Errors
/// Returns `MeetbellError::Parse` when the event has no usable start.
pub fn normalize(event: &GoogleEvent, now: DateTime<Utc>) -> Result<EventRecord> {
    let start = find_start(event)?;
    Ok(EventRecord::new(
        sanitize_title(&event.summary),
        find_join_link(event),
        event.html_link.clone(),
        start,
        now,
    ))
}

/// The hangout link when present, else the first known meeting link in the
/// summary and then the description. Empty when nothing matches.
pub fn find_join_link(event: &GoogleEvent) -> String {
    if !event.hangout_link.is_empty() {
        return event.hangout_link.clone();
    }
    [&event.summary, &event.description]
        .into_iter()
        .find_map(|text| JOIN_LINK.captures(text).map(|caps| caps[1].to_string()))
        .unwrap_or_default()
}

fn find_start(event: &GoogleEvent) -> Result<DateTime<Utc>> {
    let candidate = [&event.start, &event.original_start_time]
        .into_iter()
        .flatten()
        .flat_map(|when| [&when.date_time, &when.date])
        .find(|value| !value.is_empty())
        .ok_or_else(|| {
            MeetbellError::Parse(format!("cannot find start of event {:?}", event.id))
        })?;

    parse_start(candidate)
}

/// Parse an RFC 3339 timestamp or an all-day `YYYY-MM-DD` date (midnight UTC).
///
/// # Errors
/// Returns `MeetbellError::Parse` naming the offending value.
pub fn parse_start(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(stamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(stamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| MeetbellError::Parse(format!("cannot parse timestamp {value:?}")))
}
