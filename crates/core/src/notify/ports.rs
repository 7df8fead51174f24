//! Port interfaces for the notification engine
//!
//! These traits define the boundaries between the engine and the adapters
//! that fetch events and put alerts on screen.

use std::sync::Arc;

use async_trait::async_trait;
use meetbell_domain::{Alert, EventRecord, PresenterKind, Result};

use crate::notify::scheduler::NotifierSettings;

/// Supplies the upcoming events once per poll cycle
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch the next events, ordered by start time.
    ///
    /// A failure means no scheduling happens for this cycle; retry policy is
    /// the poll loop's business.
    async fn fetch(&self) -> Result<Vec<EventRecord>>;

    /// Short identifier used in logs.
    fn name(&self) -> &str;
}

/// Puts one alert in front of the user
#[async_trait]
pub trait Presenter: Send + Sync {
    /// Show `alert`. Returns once the user interaction (or its timeout) ends.
    async fn present(&self, alert: &Alert) -> Result<()>;

    /// Binding this presenter was built for.
    fn kind(&self) -> PresenterKind;
}

/// Builds the presenter selected by configuration
pub trait PresenterFactory: Send + Sync {
    /// Bindings this factory can build.
    fn available(&self) -> &[PresenterKind];

    /// Build the presenter for `kind`.
    ///
    /// # Errors
    /// Returns an error when the presenter cannot be set up on this host.
    fn build(&self, kind: PresenterKind, settings: &NotifierSettings)
        -> Result<Arc<dyn Presenter>>;
}
