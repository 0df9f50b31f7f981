//! Target triples and host detection for Rustle.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A Rust compilation target triple (e.g. `aarch64-linux-android`).
///
/// An empty triple is representable on purpose: it means "no explicit
/// target", and flag assembly omits every target flag for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Target {
    pub triple: String,
}

impl Target {
    /// Wrap a triple string.
    pub fn new(triple: &str) -> Self {
        Self {
            triple: triple.to_owned(),
        }
    }

    /// Whether this target names no triple at all.
    pub fn is_empty(&self) -> bool {
        self.triple.is_empty()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.triple)
    }
}

/// Detect the host target triple.
///
/// Maps the running OS/arch to the triple rustc uses for it.
///
/// # Errors
/// Returns an error if the current OS/arch has no known triple.
pub fn host_target() -> Result<Target, TargetError> {
    triple_for(std::env::consts::OS, std::env::consts::ARCH).map(Target::new)
}

fn triple_for(os: &str, arch: &str) -> Result<&'static str, TargetError> {
    let triple = match (os, arch) {
        ("linux", "x86_64") => "x86_64-unknown-linux-gnu",
        ("linux", "aarch64") => "aarch64-unknown-linux-gnu",
        ("linux", "x86") => "i686-unknown-linux-gnu",
        ("android", "aarch64") => "aarch64-linux-android",
        ("android", "arm") => "armv7-linux-androideabi",
        ("android", "x86_64") => "x86_64-linux-android",
        ("android", "x86") => "i686-linux-android",
        ("macos", "x86_64") => "x86_64-apple-darwin",
        ("macos", "aarch64") => "aarch64-apple-darwin",
        ("windows", "x86_64") => "x86_64-pc-windows-msvc",
        (os, arch) => {
            return Err(TargetError::UnsupportedHost {
                os: os.to_owned(),
                arch: arch.to_owned(),
            })
        }
    };
    Ok(triple)
}

#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error("unsupported host: {os}/{arch} has no known Rust target triple, pass an explicit target")]
    UnsupportedHost { os: String, arch: String },
}
