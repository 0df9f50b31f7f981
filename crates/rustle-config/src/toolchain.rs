//! Build-wide toolchain configuration (`rustle-toolchain.toml`).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use rustle_rustc::rules::defaults;
use rustle_util::error::UtilError;

/// Tool locations, fixed linker arguments, and build-wide flags.
///
/// Every field has a default, so an empty file (or no file at all) is a
/// usable configuration that resolves tools from `PATH`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainConfig {
    pub rustc: PathBuf,
    pub clippy_driver: PathBuf,
    pub linker: PathBuf,
    /// Placed between the startup object and each unit's link flags.
    pub linker_args: Vec<String>,
    pub zip: PathBuf,
    /// Directory the coverage data paths are made absolute against.
    pub profile_emit_prefix: String,
    /// Archive members are stored relative to this directory.
    pub archive_root: PathBuf,
    pub global_rustc_flags: Vec<String>,
    pub global_link_flags: Vec<String>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            rustc: PathBuf::from(defaults::RUSTC),
            clippy_driver: PathBuf::from(defaults::CLIPPY_DRIVER),
            linker: PathBuf::from(defaults::LINKER),
            linker_args: Vec::new(),
            zip: PathBuf::from(defaults::ZIP),
            profile_emit_prefix: defaults::PROFILE_EMIT_PREFIX.to_owned(),
            archive_root: PathBuf::from(defaults::ARCHIVE_ROOT),
            global_rustc_flags: Vec::new(),
            global_link_flags: Vec::new(),
        }
    }
}

impl ToolchainConfig {
    /// Read and parse a toolchain config from the given path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub fn from_path(path: &Path) -> Result<Self, ToolchainConfigError> {
        let content = rustle_util::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ToolchainConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Read `path` if given, otherwise use the defaults.
    ///
    /// # Errors
    /// Returns an error if `path` is given but cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ToolchainConfigError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Ok(Self::default()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ToolchainConfigError {
    #[error("{0}")]
    Read(#[from] UtilError),
    #[error("invalid toolchain config at {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}
