//! The declarative build action handed to the build graph.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use rustle_rustc::{Rule, RuleTemplates};

/// One node of the build graph: a rule plus its declared inputs and outputs.
///
/// Implicit inputs and outputs affect staleness only; they are never passed
/// positionally to the command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildAction {
    pub rule: Rule,
    /// Human-readable progress line.
    pub description: String,
    pub output: PathBuf,
    pub implicit_outputs: Vec<PathBuf>,
    pub inputs: Vec<PathBuf>,
    pub implicits: Vec<PathBuf>,
    /// Named arguments substituted into the rule's command template.
    pub args: BTreeMap<String, String>,
}

impl BuildAction {
    /// The exact command line this action runs under `templates`.
    pub fn command(&self, templates: &RuleTemplates) -> String {
        templates.render(self.rule, &self.inputs, &self.output, &self.args)
    }

    /// A SHA-256 fingerprint of everything the action declares.
    ///
    /// Identical actions always produce identical digests, so the digest can
    /// key caches across processes.
    pub fn digest(&self) -> String {
        let mut parts: Vec<String> = vec![
            self.rule.name().to_owned(),
            self.description.clone(),
            self.output.display().to_string(),
        ];
        for (tag, paths) in [
            ("implicit_outputs", &self.implicit_outputs),
            ("inputs", &self.inputs),
            ("implicits", &self.implicits),
        ] {
            parts.push(format!("{tag}:{}", paths.len()));
            parts.extend(paths.iter().map(|p| p.display().to_string()));
        }
        parts.push(format!("args:{}", self.args.len()));
        for (name, value) in &self.args {
            parts.push(name.clone());
            parts.push(value.clone());
        }
        rustle_util::hash::sha256_multi(&parts)
    }
}
