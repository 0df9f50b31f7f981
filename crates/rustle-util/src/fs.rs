//! Filesystem helpers for reading configuration and writing generated graphs.

use std::path::Path;

use crate::error::UtilError;

/// Read a whole file into a string.
///
/// # Errors
/// Returns an error if the file cannot be read or is not valid UTF-8.
pub fn read_to_string(path: &Path) -> Result<String, UtilError> {
    std::fs::read_to_string(path).map_err(|source| UtilError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Write `content` to `path` atomically.
///
/// The content is written to a sibling temp file first and then renamed over
/// `path`, so a concurrent reader never observes a half-written file.
///
/// # Errors
/// Returns an error if the temp file cannot be written or renamed. A failed
/// rename removes the temp file.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), UtilError> {
    let tmp_path = crate::path::append_suffix(path, ".tmp");
    std::fs::write(&tmp_path, content).map_err(|source| UtilError::Io {
        path: tmp_path.display().to_string(),
        source,
    })?;
    std::fs::rename(&tmp_path, path).map_err(|source| {
        let _ = std::fs::remove_file(&tmp_path);
        UtilError::Io {
            path: path.display().to_string(),
            source,
        }
    })
}
