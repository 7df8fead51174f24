//! # Meetbell Core
//!
//! The notification scheduling engine - no infrastructure dependencies.
//!
//! This crate contains:
//! - The deduplication cache shared by the scheduler and the heartbeat
//! - The heartbeat monitor that detects host suspend/resume
//! - The scheduler that arms one delayed alert per distinct event
//! - The poll loop that feeds fetched events into the scheduler
//! - Port interfaces (traits) for event sources, presenters and clocks
//!
//! ## Architecture Principles
//! - Only depends on `meetbell-domain`
//! - No HTTP, file system, or platform code
//! - All external collaborators via traits

pub mod notify;
pub mod time;

// Re-export specific items to avoid ambiguity
pub use notify::cache::DedupCache;
pub use notify::error::{PollError, SchedulerError, SchedulerResult};
pub use notify::heartbeat::{HeartbeatMonitor, HeartbeatSettings, Pulse};
pub use notify::poller::{PollLoop, PollReport, PollSettings};
pub use notify::ports::{EventSource, Presenter, PresenterFactory};
pub use notify::scheduler::{
    Decision, NotifierSettings, ScheduleSummary, Scheduler, SuppressReason,
};
pub use time::{Clock, ManualClock, SystemClock};
