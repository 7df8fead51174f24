//! Observability infrastructure
//!
//! Structured logging through `tracing`. Every component logs snake_case
//! event names with key/value fields; this module only decides where those
//! records go.

pub mod logging;

pub use logging::{build_filter, init, LogGuard};
