//! Error types for rustle-engine.

use rustle_rustc::RustcError;

/// Errors produced while turning configuration into build actions.
///
/// Synthesizing actions from an already-valid request cannot fail; every
/// variant here comes from loading or validating input.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A unit manifest names an invalid crate kind or unpaired startup objects.
    #[error("invalid unit {path}: {source}")]
    InvalidUnit { path: String, source: RustcError },

    /// The host target triple could not be determined.
    #[error("{0}")]
    Target(#[from] rustle_targets::TargetError),

    /// A unit manifest could not be loaded.
    #[error("{0}")]
    Manifest(#[from] rustle_config::manifest::ManifestError),
}
