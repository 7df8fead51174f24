use std::sync::Arc;

use async_trait::async_trait;
use meetbell_core::{NotifierSettings, Presenter, PresenterFactory};
use meetbell_domain::{Alert, MeetbellError, PresenterKind, Result as DomainResult};
use parking_lot::Mutex;

/// Presenter that records every alert it is asked to show.
///
/// Alerts whose title is listed in `fail_on` are rejected with a platform
/// error instead, after being counted as attempts.
#[derive(Default)]
pub struct RecordingPresenter {
    shown: Mutex<Vec<Alert>>,
    attempts: Mutex<usize>,
    fail_on: Vec<String>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(titles: &[&str]) -> Self {
        Self { fail_on: titles.iter().map(ToString::to_string).collect(), ..Self::default() }
    }

    /// Alerts presented successfully, in order.
    pub fn shown(&self) -> Vec<Alert> {
        self.shown.lock().clone()
    }

    pub fn shown_titles(&self) -> Vec<String> {
        self.shown.lock().iter().map(|alert| alert.title.clone()).collect()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock()
    }
}

#[async_trait]
impl Presenter for RecordingPresenter {
    async fn present(&self, alert: &Alert) -> DomainResult<()> {
        *self.attempts.lock() += 1;
        if self.fail_on.contains(&alert.title) {
            return Err(MeetbellError::Platform(format!("cannot show {}", alert.title)));
        }
        self.shown.lock().push(alert.clone());
        Ok(())
    }

    fn kind(&self) -> PresenterKind {
        PresenterKind::Log
    }
}

/// Factory that hands out one prebuilt presenter for the `log` binding.
pub struct StaticFactory {
    presenter: Arc<dyn Presenter>,
}

impl StaticFactory {
    pub fn new(presenter: Arc<dyn Presenter>) -> Self {
        Self { presenter }
    }
}

impl PresenterFactory for StaticFactory {
    fn available(&self) -> &[PresenterKind] {
        &[PresenterKind::Log]
    }

    fn build(
        &self,
        _kind: PresenterKind,
        _settings: &NotifierSettings,
    ) -> DomainResult<Arc<dyn Presenter>> {
        Ok(Arc::clone(&self.presenter))
    }
}

/// Factory whose presenter can never be built on this host.
pub struct BrokenFactory;

impl PresenterFactory for BrokenFactory {
    fn available(&self) -> &[PresenterKind] {
        &[PresenterKind::Log]
    }

    fn build(
        &self,
        _kind: PresenterKind,
        _settings: &NotifierSettings,
    ) -> DomainResult<Arc<dyn Presenter>> {
        Err(MeetbellError::Platform("no display available".into()))
    }
}
