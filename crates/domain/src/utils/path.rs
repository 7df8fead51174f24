//! Path helpers

use std::path::PathBuf;

use crate::errors::{MeetbellError, Result};

/// Expand a leading `~/` to the current user's home directory.
///
/// Paths without the prefix are returned unchanged.
///
/// # Errors
/// Returns `MeetbellError::InvalidInput` for a blank path and
/// `MeetbellError::Config` when the home directory cannot be found.
pub fn expand_path(path: &str) -> Result<PathBuf> {
    if path.trim().is_empty() {
        return Err(MeetbellError::InvalidInput("path must not be empty".into()));
    }
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir().ok_or_else(|| {
                MeetbellError::Config("cannot find the user's home directory".into())
            })?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(path)),
    }
}
