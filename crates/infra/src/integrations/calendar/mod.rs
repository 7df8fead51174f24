//! Calendar event sources
//!
//! - [`google`]: Google Calendar over its REST API
//! - [`file_source`]: a local JSON file, for offline runs and demos
//! - [`normalize`]: Google payload → `EventRecord`

pub mod file_source;
pub mod google;
pub mod normalize;

pub use file_source::FileEventSource;
pub use google::{GoogleCalendarSource, TokenSource, ACCESS_TOKEN_ENV};
pub use normalize::{find_join_link, normalize, parse_start, GoogleEvent};
