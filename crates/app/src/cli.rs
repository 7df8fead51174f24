//! Command-line flags

use std::path::PathBuf;

use clap::Parser;
use meetbell_domain::Config;

/// Command-line flags; each one overrides its config file value.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "meetbell",
    version,
    about = "Meeting reminder daemon",
    long_about = "Polls your calendars and pops up an alert shortly before each meeting\nthat has a video-call link."
)]
pub struct Cli {
    /// Config file path (TOML or JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Stop after this many poll cycles; 0 polls forever
    #[arg(long)]
    pub loops: Option<u32>,

    /// Write logs to this file instead of stdout
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Notification type, e.g. `macos_osascript` or `log`
    #[arg(short, long)]
    pub presenter: Option<String>,
}

impl Cli {
    /// Flags win over both the config file and the environment.
    pub fn apply(&self, config: &mut Config) {
        if let Some(loops) = self.loops {
            config.polling.loops = loops;
        }
        if let Some(path) = &self.log {
            config.logging.file = Some(path.clone());
        }
        if let Some(presenter) = &self.presenter {
            config.notifier.presenter.clone_from(presenter);
        }
    }
}
