//! Alert presenters
//!
//! - [`osascript`]: AppleScript dialog (macOS)
//! - [`log`]: writes the alert to the log

pub mod log;
pub mod osascript;

use std::sync::Arc;

use meetbell_core::{NotifierSettings, Presenter, PresenterFactory};
use meetbell_domain::{PresenterKind, Result};

pub use self::log::LogPresenter;
pub use self::osascript::OsascriptPresenter;

#[cfg(target_os = "macos")]
const AVAILABLE: &[PresenterKind] = &[PresenterKind::MacosOsascript, PresenterKind::Log];

#[cfg(not(target_os = "macos"))]
const AVAILABLE: &[PresenterKind] = &[PresenterKind::Log];

/// Builds the presenters this host supports.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformPresenterFactory;

impl PresenterFactory for PlatformPresenterFactory {
    fn available(&self) -> &[PresenterKind] {
        AVAILABLE
    }

    fn build(&self, kind: PresenterKind, _settings: &NotifierSettings) -> Result<Arc<dyn Presenter>> {
        Ok(match kind {
            PresenterKind::MacosOsascript => Arc::new(OsascriptPresenter::new()),
            PresenterKind::Log => Arc::new(LogPresenter),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn settings() -> NotifierSettings {
        NotifierSettings {
            presenter: "log".into(),
            lead_time: Duration::from_secs(60),
            visibility: Duration::from_secs(120),
            browser: None,
            stale_tolerance: Duration::from_secs(60),
        }
    }

    #[test]
    fn log_is_always_available() {
        assert!(PlatformPresenterFactory.available().contains(&PresenterKind::Log));
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn osascript_available_on_macos() {
        assert!(PlatformPresenterFactory.available().contains(&PresenterKind::MacosOsascript));
    }

    #[test]
    fn builds_requested_kind() {
        let presenter = PlatformPresenterFactory.build(PresenterKind::Log, &settings()).unwrap();
        assert_eq!(presenter.kind(), PresenterKind::Log);

        let presenter =
            PlatformPresenterFactory.build(PresenterKind::MacosOsascript, &settings()).unwrap();
        assert_eq!(presenter.kind(), PresenterKind::MacosOsascript);
    }
}
