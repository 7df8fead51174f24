//! Google Calendar event source

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use meetbell_core::{Clock, EventSource};
use meetbell_domain::{expand_path, CalendarConfig, EventRecord, MeetbellError, Result};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::normalize::{normalize, GoogleEvent};
use crate::http::HttpClient;

/// Environment variable that supplies a bearer token directly.
pub const ACCESS_TOKEN_ENV: &str = "MEETBELL_ACCESS_TOKEN";

/// Where the bearer token comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// A fixed token, e.g. from [`ACCESS_TOKEN_ENV`].
    Static(String),
    /// A JSON file with an `access_token` field, re-read on every fetch so an
    /// external refresher can rotate it.
    File(PathBuf),
}

#[derive(Debug, Deserialize)]
struct TokenFile {
    access_token: String,
    #[serde(default)]
    expiry: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    items: Vec<GoogleEvent>,
}

#[derive(Debug, Deserialize)]
struct CalendarListResponse {
    #[serde(default)]
    items: Vec<CalendarListEntry>,
}

#[derive(Debug, Deserialize)]
struct CalendarListEntry {
    id: String,
}

/// Fetches upcoming events from one or more Google calendars.
pub struct GoogleCalendarSource {
    http: HttpClient,
    api_base: String,
    calendar_ids: Vec<String>,
    max_results: u32,
    lookahead: chrono::Duration,
    token: TokenSource,
    clock: Arc<dyn Clock>,
}

impl GoogleCalendarSource {
    /// Build a source from configuration.
    ///
    /// A non-empty [`ACCESS_TOKEN_ENV`] takes precedence over the token file.
    ///
    /// # Errors
    /// Fails when the token path cannot be expanded or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &CalendarConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let token = match std::env::var(ACCESS_TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => TokenSource::Static(token.trim().to_string()),
            _ => TokenSource::File(expand_path(&config.token_file)?),
        };
        let http = HttpClient::builder()
            .timeout(config.client_timeout())
            .user_agent(concat!("meetbell/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::new(http, config, token, clock))
    }

    /// Build a source with an explicit client and token source.
    pub fn new(
        http: HttpClient,
        config: &CalendarConfig,
        token: TokenSource,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let lookahead = chrono::Duration::from_std(config.lookahead())
            .unwrap_or_else(|_| chrono::Duration::days(1));
        Self {
            http,
            api_base: config.api_base.clone(),
            calendar_ids: config.calendar_ids.clone(),
            max_results: config.max_results_per_poll,
            lookahead,
            token,
            clock,
        }
    }

    /// Check that every configured calendar exists for this account.
    ///
    /// `primary` always exists.
    ///
    /// # Errors
    /// Returns `MeetbellError::Config` naming the unknown calendar, or the
    /// transport error when the calendar list cannot be fetched.
    pub async fn verify_calendars(&self) -> Result<()> {
        let url = self.url(&["users", "me", "calendarList"])?;
        let token = self.access_token().await?;
        let listing: CalendarListResponse =
            self.http.get_json(url, &token, &[("showDeleted", "false".to_string())]).await?;

        let available: Vec<String> = listing.items.into_iter().map(|entry| entry.id).collect();
        for id in &self.calendar_ids {
            if id != "primary" && !available.contains(id) {
                return Err(MeetbellError::Config(format!(
                    "no such calendar {id:?}, available: {available:?}"
                )));
            }
        }
        info!(calendars = ?self.calendar_ids, "calendars_verified");
        Ok(())
    }

    async fn fetch_calendar(&self, calendar_id: &str, token: &str) -> Result<Vec<EventRecord>> {
        let now = self.clock.now();
        let time_max = now.checked_add_signed(self.lookahead).unwrap_or(now);
        let url = self.url(&["calendars", calendar_id, "events"])?;

        let query = [
            ("maxResults", self.max_results.to_string()),
            ("showDeleted", "false".to_string()),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
            ("timeMin", now.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("timeMax", time_max.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ];

        let response: EventsResponse = self.http.get_json(url, token, &query).await.map_err(|err| {
            warn!(calendar = calendar_id, error = %err, "calendar_events_request_failed");
            err
        })?;

        let records = response
            .items
            .iter()
            .map(|event| normalize(event, now))
            .collect::<Result<Vec<_>>>()?;
        debug!(calendar = calendar_id, upcoming = records.len(), "calendar_events_fetched");
        Ok(records)
    }

    async fn access_token(&self) -> Result<String> {
        match &self.token {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::File(path) => {
                let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
                    MeetbellError::Auth(format!("cannot read token file {}: {e}", path.display()))
                })?;
                let token: TokenFile = serde_json::from_str(&contents).map_err(|e| {
                    MeetbellError::Auth(format!("invalid token file {}: {e}", path.display()))
                })?;
                if token.access_token.trim().is_empty() {
                    return Err(MeetbellError::Auth(format!(
                        "token file {} has no access_token",
                        path.display()
                    )));
                }
                if let Some(expiry) = token.expiry.filter(|expiry| *expiry <= self.clock.now()) {
                    warn!(expiry = %expiry.to_rfc3339(), "access_token_expired");
                }
                Ok(token.access_token)
            }
        }
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.api_base).map_err(|e| {
            MeetbellError::Config(format!("invalid calendar api base {:?}: {e}", self.api_base))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                MeetbellError::Config(format!("calendar api base {:?} cannot be a base", self.api_base))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl EventSource for GoogleCalendarSource {
    async fn fetch(&self) -> Result<Vec<EventRecord>> {
        let token = self.access_token().await?;
        let mut records = Vec::new();
        for calendar_id in &self.calendar_ids {
            records.extend(self.fetch_calendar(calendar_id, &token).await?);
        }
        records.sort_by_key(|record| record.start_time);
        Ok(records)
    }

    fn name(&self) -> &str {
        "google_calendar"
    }
}
