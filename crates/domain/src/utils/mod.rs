//! Pure helper functions shared by adapters

pub mod path;
pub mod sanitize;
