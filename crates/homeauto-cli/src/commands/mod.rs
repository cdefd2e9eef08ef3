//! Command implementations

pub(crate) mod evaluate;
pub(crate) mod generate;
pub(crate) mod predict;
pub(crate) mod serve;
pub(crate) mod train;

use crate::error::{CliError, Result};
use std::path::Path;

/// Fails early with a precise error when `path` is missing or a directory.
pub(crate) fn require_file(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(CliError::NotAFile(path.to_path_buf()));
    }
    Ok(())
}
