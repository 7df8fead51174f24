//! Configuration loader
//!
//! Loads application configuration from a file, then applies environment
//! overrides and validates the result.
//!
//! ## Loading Strategy
//! 1. Use the explicit path when one is given (it must exist)
//! 2. Otherwise probe the standard locations; none found means defaults
//! 3. Apply `MEETBELL_*` environment overrides
//! 4. Validate cross-field constraints
//!
//! ## Environment Variables
//! - `MEETBELL_PRESENTER`: Presenter binding (`macos_osascript`, `log`)
//! - `MEETBELL_LEAD_SECONDS`: Seconds before the start an alert appears
//! - `MEETBELL_VISIBILITY_SECONDS`: Seconds an alert stays on screen
//! - `MEETBELL_BROWSER`: Browser used for links, empty for the default
//! - `MEETBELL_POLL_INTERVAL`: Seconds between calendar polls
//! - `MEETBELL_CALENDAR_IDS`: Comma separated calendar ids
//! - `MEETBELL_TOKEN_FILE`: Path to the OAuth token JSON
//! - `MEETBELL_LOG_FILE`: Log file, empty for stdout
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./meetbell.toml`
//! 2. `./meetbell.json`
//! 3. `~/.meetbell/config.toml`

use std::path::{Path, PathBuf};
use std::str::FromStr;

use meetbell_domain::{Config, MeetbellError, Result};

/// Load, override and validate the configuration.
///
/// # Arguments
/// * `path` - Optional explicit config file. If `None`, uses
///   [`probe_config_paths`] and falls back to defaults.
///
/// # Errors
/// Returns `MeetbellError::Config` if:
/// - The explicit file does not exist
/// - File format is invalid
/// - An environment override cannot be parsed
/// - Validation fails
pub fn load(path: Option<PathBuf>) -> Result<Config> {
    let mut config = match path {
        Some(path) => load_from_file(&path)?,
        None => match probe_config_paths() {
            Some(found) => load_from_file(&found)?,
            None => {
                tracing::info!("No config file found, using defaults");
                Config::default()
            }
        },
    };

    apply_env_overrides(&mut config)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// Supports both JSON and TOML formats (detected by file extension).
/// Sections and fields left out keep their defaults.
///
/// # Errors
/// Returns `MeetbellError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Err(MeetbellError::Config(format!("Config file not found: {}", path.display())));
    }

    tracing::info!(path = %path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(path)
        .map_err(|e| MeetbellError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `MeetbellError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| MeetbellError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| MeetbellError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(MeetbellError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join("meetbell.toml"));
        candidates.push(cwd.join("meetbell.json"));
    }

    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".meetbell").join("config.toml"));
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Apply `MEETBELL_*` environment variables on top of `config`.
///
/// Unset variables leave the corresponding field alone.
///
/// # Errors
/// Returns `MeetbellError::Config` when a numeric variable does not parse.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Some(presenter) = env_string("MEETBELL_PRESENTER") {
        config.notifier.presenter = presenter;
    }
    if let Some(lead) = env_parse::<u64>("MEETBELL_LEAD_SECONDS")? {
        config.notifier.lead_seconds = lead;
    }
    if let Some(visibility) = env_parse::<u64>("MEETBELL_VISIBILITY_SECONDS")? {
        config.notifier.visibility_seconds = visibility;
    }
    if let Some(browser) = env_string("MEETBELL_BROWSER") {
        config.notifier.browser = Some(browser).filter(|b| !b.is_empty());
    }
    if let Some(interval) = env_parse::<u64>("MEETBELL_POLL_INTERVAL")? {
        config.polling.interval_seconds = interval;
    }
    if let Some(ids) = env_string("MEETBELL_CALENDAR_IDS") {
        config.calendar.calendar_ids = split_list(&ids);
    }
    if let Some(token_file) = env_string("MEETBELL_TOKEN_FILE") {
        config.calendar.token_file = token_file;
    }
    if let Some(log_file) = env_string("MEETBELL_LOG_FILE") {
        config.logging.file = Some(PathBuf::from(log_file)).filter(|p| !p.as_os_str().is_empty());
    }
    Ok(())
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|value| value.trim().to_string())
}

/// Parse an optional environment variable
///
/// # Errors
/// Returns `MeetbellError::Config` if the variable is set but invalid.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_string(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| MeetbellError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect()
}
