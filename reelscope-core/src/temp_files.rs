//! Temporary file management utilities.
//!
//! Scratch files are created through the tempfile crate so they are removed
//! when dropped, on success and error paths alike.

use crate::error::CoreResult;
use std::path::{Path, PathBuf};
use tempfile::{Builder as TempFileBuilder, NamedTempFile};

/// Resolves the scratch directory: the configured one, or the system default.
#[must_use]
pub fn temp_base_dir(configured: Option<&Path>) -> PathBuf {
    configured.map_or_else(std::env::temp_dir, Path::to_path_buf)
}

/// Creates a temporary file with prefix and extension. Auto-deleted when dropped.
pub fn create_temp_file(dir: &Path, prefix: &str, extension: &str) -> CoreResult<NamedTempFile> {
    std::fs::create_dir_all(dir)?;
    let temp_file = TempFileBuilder::new()
        .prefix(&format!("{prefix}_"))
        .suffix(&format!(".{extension}"))
        .tempfile_in(dir)?;

    log::trace!("Created temp file {}", temp_file.path().display());
    Ok(temp_file)
}
