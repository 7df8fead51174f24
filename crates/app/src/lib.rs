//! # Meetbell
//!
//! Wires the domain, engine and infrastructure crates into the `meetbell`
//! binary: flag parsing and the application context that owns the cache,
//! scheduler, heartbeat and poll loop for one run.

pub mod cli;
pub mod context;

pub use cli::Cli;
pub use context::AppContext;
