//! # Meetbell Domain
//!
//! Business domain types and models for Meetbell.
//!
//! This crate contains:
//! - The normalized event record and its deduplication fingerprint
//! - Presentation types handed to alert presenters
//! - Configuration structures
//! - Domain error types and Result definitions
//!
//! ## Architecture
//! - No dependencies on other Meetbell crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::path::expand_path;
pub use utils::sanitize::sanitize_title;
