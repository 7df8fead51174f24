//! # Meetbell CLI
//!
//! Usage:
//!   meetbell                          # poll forever with ./meetbell.toml or defaults
//!   meetbell --loops 1 -p log         # one poll cycle, alerts to the log
//!   meetbell --config cfg.toml --log /tmp/meetbell.log

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use meetbell_app::{AppContext, Cli};
use meetbell_infra::{config, observability};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = config::load(cli.config.clone()).context("failed to load configuration")?;
    cli.apply(&mut config);
    let _log_guard = observability::init(&config.logging).context("failed to initialize logging")?;

    let context = AppContext::new(config).await.context("failed to start")?;

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown_requested");
                ctrl_c.cancel();
            }
            Err(err) => warn!(error = %err, "ctrl_c_handler_unavailable"),
        }
    });

    match context.run(&cancel).await {
        Ok(report) => {
            info!(
                cycles = report.cycles,
                armed = report.armed,
                suppressed = report.suppressed,
                fetch_failures = report.fetch_failures,
                "poll_loop_finished"
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            error!(error = %err, "poll_loop_gave_up");
            Ok(ExitCode::FAILURE)
        }
    }
}
