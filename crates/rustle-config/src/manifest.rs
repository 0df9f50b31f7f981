use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use rustle_util::error::UtilError;

/// A `rustle.toml` describing one compilation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitManifest {
    #[serde(rename = "crate")]
    pub krate: CrateSection,
    #[serde(default)]
    pub flags: FlagsSection,
    #[serde(default)]
    pub deps: DepsSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrateSection {
    /// Crate name; empty means rustc derives it from the source file.
    #[serde(default)]
    pub name: String,
    /// One of `binary`, `rlib`, `dylib`, `staticlib`, `cdylib`, `proc-macro`.
    /// Validated when the manifest is turned into a request.
    pub kind: String,
    pub src: PathBuf,
    pub output: PathBuf,
    /// Target triple, `"host"`, or absent for no explicit target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub link_dirs: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlagsSection {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rustc: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub link: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clippy: Vec<String>,
    #[serde(default)]
    pub coverage: bool,
    #[serde(default)]
    pub lint: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DepsSection {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rlibs: Vec<CrateDepEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dylibs: Vec<CrateDepEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub proc_macros: Vec<CrateDepEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub static_libs: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared_libs: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crt_begin: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crt_end: Option<PathBuf>,
}

/// A `{ name, path }` crate dependency entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrateDepEntry {
    pub name: String,
    pub path: PathBuf,
}

impl UnitManifest {
    /// Read and parse a `rustle.toml` from the given path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let content = rustle_util::fs::read_to_string(path)?;
        Self::parse(&content, path)
    }

    /// Parse manifest text; `origin` is only used in error messages.
    ///
    /// # Errors
    /// Returns an error if the text is not a valid unit manifest.
    pub fn parse(content: &str, origin: &Path) -> Result<Self, ManifestError> {
        toml::from_str(content).map_err(|e| ManifestError::Parse {
            path: origin.display().to_string(),
            source: e,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("{0}")]
    Read(#[from] UtilError),
    #[error("invalid rustle.toml at {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}
