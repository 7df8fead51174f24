use std::path::Path;
use std::process::Command;
use std::{env, fs};

use anyhow::{Context, Result};
use chrono::{Duration, SecondsFormat, Utc};
use serde_json::json;

/// Run the daemon for one poll cycle against a generated events file.
///
/// Exercises config loading, the file source, the scheduler and the log
/// presenter without network access.
pub fn run_smoke() -> Result<()> {
    let dir = env::temp_dir().join(format!("meetbell-smoke-{}", std::process::id()));
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let events = dir.join("events.json");
    let config = dir.join("meetbell.toml");
    let log = dir.join("meetbell.log");
    write_fixtures(&events, &config)?;

    println!("Running meetbell once against {}...", events.display());
    let status = Command::new("cargo")
        .args(["run", "-q", "-p", "meetbell-app", "--bin", "meetbell", "--"])
        .arg("--config")
        .arg(&config)
        .args(["--loops", "1", "--presenter", "log", "--log"])
        .arg(&log)
        .status()
        .context("Failed to run meetbell")?;

    if !status.success() {
        anyhow::bail!("meetbell exited with {status}");
    }

    let output = fs::read_to_string(&log)
        .with_context(|| format!("Failed to read log file {}", log.display()))?;
    for expected in ["poll_cycle_completed", "meeting_alert", "meetbell_stopped"] {
        if !output.contains(expected) {
            anyhow::bail!("Log is missing {expected:?}; see {}", log.display());
        }
    }

    fs::remove_dir_all(&dir).ok();
    println!("✓ Smoke run passed");
    Ok(())
}

fn write_fixtures(events: &Path, config: &Path) -> Result<()> {
    let starts_in = |seconds: i64| {
        (Utc::now() + Duration::seconds(seconds)).to_rfc3339_opts(SecondsFormat::Secs, true)
    };
    let fixture = json!([
        { "title": "Smoke standup", "join_link": "https://meet.google.com/smk-test-one", "start": starts_in(20) },
        { "title": "Smoke lunch", "start": starts_in(600) }
    ]);
    fs::write(events, serde_json::to_string_pretty(&fixture)?)
        .with_context(|| format!("Failed to write {}", events.display()))?;

    let toml = format!(
        "[calendar]\nevents_file = {:?}\n\n[notifier]\nlead_seconds = 60\n",
        events.display().to_string()
    );
    fs::write(config, toml).with_context(|| format!("Failed to write {}", config.display()))?;
    Ok(())
}
