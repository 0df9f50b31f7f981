//! Pure path derivations for sibling artifacts.
//!
//! Nothing here touches the filesystem: every function maps a path to
//! another path by string manipulation only.

use std::path::{Path, PathBuf};

/// Append a raw `suffix` to the final component of `path`.
///
/// Unlike [`Path::with_extension`], an existing extension is kept:
/// `out/libfoo.rlib` + `.clippy` becomes `out/libfoo.rlib.clippy`.
pub fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(suffix);
    PathBuf::from(raw)
}

/// Replace the extension of `path` with `ext`, or append `.ext` when the
/// path has no (or an empty) extension.
///
/// ```
/// use std::path::Path;
/// use rustle_util::path::replace_extension;
///
/// assert_eq!(replace_extension(Path::new("out/libbar.rlib"), "gcno"), Path::new("out/libbar.gcno"));
/// assert_eq!(replace_extension(Path::new("out/bar"), "gcno"), Path::new("out/bar.gcno"));
/// ```
pub fn replace_extension(path: &Path, ext: &str) -> PathBuf {
    match path.extension() {
        Some(current) if !current.is_empty() => path.with_extension(ext),
        _ => append_suffix(path, &format!(".{ext}")),
    }
}
