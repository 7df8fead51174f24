//! Shared helpers for `meetbell-infra` integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use meetbell_core::ManualClock;
use meetbell_domain::CalendarConfig;
use meetbell_infra::{GoogleCalendarSource, HttpClient, TokenSource};
use serde_json::{json, Value};
use tempfile::TempDir;

/// Fixed "now" for calendar scenarios.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
}

/// A timed Google event payload.
pub fn google_event(summary: &str, start: &str, hangout_link: Option<&str>) -> Value {
    let mut event = json!({
        "id": summary.to_lowercase().replace(' ', "-"),
        "status": "confirmed",
        "summary": summary,
        "htmlLink": format!("https://calendar.google.com/event?eid={}", summary.len()),
        "start": { "dateTime": start },
        "end": { "dateTime": start },
    });
    if let Some(link) = hangout_link {
        event["hangoutLink"] = json!(link);
    }
    event
}

/// An `events.list` response body.
pub fn events_page(items: Vec<Value>) -> Value {
    json!({ "kind": "calendar#events", "items": items })
}

/// Token file on disk for the lifetime of the returned guard.
pub struct TokenFixture {
    pub path: PathBuf,
    _dir: TempDir,
}

impl TokenFixture {
    pub fn new(access_token: &str) -> Self {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let path = dir.path().join("token.json");
        std::fs::write(
            &path,
            json!({ "access_token": access_token, "token_type": "Bearer" }).to_string(),
        )
        .expect("token file should be written");
        Self { path, _dir: dir }
    }
}

/// Source pointed at `api_base`, authenticating with `token`.
pub fn google_source(api_base: &str, calendar_ids: &[&str], token: TokenSource) -> GoogleCalendarSource {
    let config = CalendarConfig {
        api_base: api_base.to_string(),
        calendar_ids: calendar_ids.iter().map(ToString::to_string).collect(),
        ..CalendarConfig::default()
    };
    let http = HttpClient::builder()
        .max_attempts(1)
        .build()
        .expect("http client should build");
    GoogleCalendarSource::new(http, &config, token, Arc::new(ManualClock::new(now())))
}
