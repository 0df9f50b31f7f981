//! Coverage artifact paths and the coverage archive action.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use rustle_rustc::Rule;
use rustle_util::path::replace_extension;

use crate::action::BuildAction;

/// Coverage notes and data files of one compiled unit.
///
/// Both paths come from [`derive`] so the data path rustc is told to write and
/// the notes path the graph declares never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageArtifact {
    /// Structural notes (`.gcno`), written at compile time.
    pub notes: PathBuf,
    /// Execution counts (`.gcda`), written when the instrumented code runs.
    pub data: PathBuf,
}

impl CoverageArtifact {
    /// The rustc flag directing profile data to [`CoverageArtifact::data`].
    pub fn profile_emit_flag(&self, prefix: &str) -> String {
        let data = self.data.strip_prefix("/").unwrap_or(&self.data);
        format!("-Z profile-emit={prefix}/{}", data.display())
    }
}

/// Derive the coverage sibling paths of `output`.
///
/// `libbar.rlib` gives `libbar.gcno` / `libbar.gcda`; an extensionless
/// `libbar` gets `.gcno` / `.gcda` appended.
pub fn derive(output: &Path) -> CoverageArtifact {
    CoverageArtifact {
        notes: replace_extension(output, "gcno"),
        data: replace_extension(output, "gcda"),
    }
}

/// Archive coverage notes into `<base_name>.zip`.
///
/// Returns `None` when `notes` is empty. Duplicate paths collapse into one
/// archive member and inputs are sorted.
pub fn archive<P: AsRef<Path>>(notes: &[P], base_name: &str) -> Option<BuildAction> {
    if notes.is_empty() {
        return None;
    }

    let inputs: BTreeSet<PathBuf> = notes.iter().map(|p| p.as_ref().to_path_buf()).collect();
    let output = PathBuf::from(format!("{base_name}.zip"));
    let file_name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    tracing::debug!(output = %output.display(), members = inputs.len(), "coverage archive");
    Some(BuildAction {
        rule: Rule::Archive,
        description: format!("{} {file_name}", Rule::Archive.verb()),
        output,
        implicit_outputs: Vec::new(),
        inputs: inputs.into_iter().collect(),
        implicits: Vec::new(),
        args: Default::default(),
    })
}
