//! Event source backed by a local JSON file
//!
//! The file holds an array of events:
//!
//! ```json
//! [
//!   {
//!     "title": "Standup",
//!     "join_link": "https://meet.google.com/abc-defg-hij",
//!     "calendar_link": "https://calendar.google.com/event?eid=1",
//!     "start": "2024-05-01T09:30:00Z"
//!   }
//! ]
//! ```
//!
//! It is re-read on every fetch, so editing it while the daemon runs is the
//! offline equivalent of changing the calendar.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use meetbell_core::{Clock, EventSource};
use meetbell_domain::{sanitize_title, EventRecord, MeetbellError, Result};
use serde::Deserialize;
use tracing::debug;

use crate::errors::InfraError;

#[derive(Debug, Deserialize)]
struct FileEvent {
    title: String,
    #[serde(default)]
    join_link: String,
    #[serde(default)]
    calendar_link: String,
    start: DateTime<Utc>,
}

/// Reads upcoming events from a JSON file.
pub struct FileEventSource {
    path: PathBuf,
    lookahead: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl FileEventSource {
    /// Events starting more than `lookahead` from now are left out.
    pub fn new(path: impl Into<PathBuf>, lookahead: std::time::Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            lookahead: chrono::Duration::from_std(lookahead)
                .unwrap_or_else(|_| chrono::Duration::days(1)),
            clock,
        }
    }

    /// File read on every fetch.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl EventSource for FileEventSource {
    async fn fetch(&self) -> Result<Vec<EventRecord>> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            MeetbellError::from(InfraError::from(e))
        })?;
        let entries: Vec<FileEvent> = serde_json::from_str(&contents)
            .map_err(|e| MeetbellError::from(InfraError::from(e)))?;

        let now = self.clock.now();
        let horizon = now.checked_add_signed(self.lookahead).unwrap_or(now);
        let mut records: Vec<EventRecord> = entries
            .into_iter()
            .filter(|entry| entry.start <= horizon)
            .map(|entry| {
                EventRecord::new(
                    sanitize_title(&entry.title),
                    entry.join_link.trim(),
                    entry.calendar_link.trim(),
                    entry.start,
                    now,
                )
            })
            .collect();
        records.sort_by_key(|record| record.start_time);

        debug!(path = %self.path.display(), upcoming = records.len(), "file_events_loaded");
        Ok(records)
    }

    fn name(&self) -> &str {
        "events_file"
    }
}
