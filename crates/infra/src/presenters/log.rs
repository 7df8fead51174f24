//! Presenter that only writes the alert to the log

use async_trait::async_trait;
use meetbell_core::Presenter;
use meetbell_domain::{Alert, PresenterKind, Result};
use tracing::info;

/// Logs each alert at `info`. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPresenter;

#[async_trait]
impl Presenter for LogPresenter {
    async fn present(&self, alert: &Alert) -> Result<()> {
        info!(
            title = %alert.title,
            join_link = %alert.join_link,
            calendar_link = %alert.calendar_link,
            visibility_seconds = alert.visibility.as_secs(),
            browser = alert.browser.as_deref().unwrap_or("default"),
            "meeting_alert"
        );
        Ok(())
    }

    fn kind(&self) -> PresenterKind {
        PresenterKind::Log
    }
}
