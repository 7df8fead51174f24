//! Notification scheduling engine
//!
//! - [`cache`]: fingerprints of events that already have an alert armed
//! - [`heartbeat`]: clears the cache when the host clock jumps forward
//! - [`scheduler`]: decides per event whether to arm a delayed alert
//! - [`poller`]: drives fetch → schedule cycles
//!
//! The cache is the only shared mutable state. Every armed alert is an
//! independent task that talks to nothing but the presenter.

pub mod cache;
pub mod error;
pub mod heartbeat;
pub mod poller;
pub mod ports;
pub mod scheduler;
