//! Crate action synthesis: one compilation request in, one or two build
//! actions out.
//!
//! Everything here is a pure function of its arguments. Nothing is cached
//! between calls and nothing is registered as a side effect, so requests can
//! be synthesized from any number of threads at once.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::debug;

use rustle_rustc::flags::{self, AssembledFlags, FlagConfiguration};
use rustle_rustc::rules::arg;
use rustle_rustc::{deps, CrateKind, DependencySet, Rule, RuleTemplates};
use rustle_targets::Target;
use rustle_util::path::append_suffix;

use crate::action::BuildAction;
use crate::coverage::{self, CoverageArtifact};

/// What to compile and where the artifact goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationRequest {
    pub main_src: PathBuf,
    /// Crate name; empty leaves naming to rustc.
    pub crate_name: String,
    pub crate_kind: CrateKind,
    /// Target triple; empty means no explicit target.
    pub target: Target,
    /// Extra `-L` search directories.
    pub link_dirs: Vec<PathBuf>,
    pub output: PathBuf,
}

/// The artifacts a compiled request declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    pub output_file: PathBuf,
    /// Present exactly when coverage was enabled.
    pub coverage: Option<CoverageArtifact>,
}

/// Everything [`build_crate`] synthesizes for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrateActions {
    /// The clippy pass; the compile action depends on its marker output.
    pub lint: Option<BuildAction>,
    pub compile: BuildAction,
    pub output: BuildOutput,
}

impl CrateActions {
    /// The actions in registration order: lint (if any), then compile.
    pub fn into_actions(self) -> Vec<BuildAction> {
        self.lint.into_iter().chain([self.compile]).collect()
    }
}

/// The lint marker written by the clippy pass for `output`.
pub fn lint_marker(output: &std::path::Path) -> PathBuf {
    append_suffix(output, ".clippy")
}

/// Synthesize the actions that build `request`.
///
/// The crate kind selects the entry: kinds producing a final linked artifact
/// (binary, staticlib, cdylib) get `-C lto` appended to the unit's rustc
/// flags; every kind then goes through the same synthesis.
pub fn build_crate(
    templates: &RuleTemplates,
    request: &CompilationRequest,
    deps: &DependencySet,
    flags: &FlagConfiguration,
) -> CrateActions {
    if request.crate_kind.wants_lto() {
        transform_src_to_crate(templates, request, deps, &flags.clone().with_lto())
    } else {
        transform_src_to_crate(templates, request, deps, flags)
    }
}

fn transform_src_to_crate(
    templates: &RuleTemplates,
    request: &CompilationRequest,
    deps: &DependencySet,
    flags: &FlagConfiguration,
) -> CrateActions {
    let AssembledFlags {
        rustc: mut rustc_flags,
        link: link_flags,
    } = flags::assemble(
        flags,
        request.crate_kind,
        &request.crate_name,
        &request.target,
    );
    let linked = deps::link(deps, &request.link_dirs);
    let mut implicits = linked.implicits;

    let coverage = flags.coverage.then(|| coverage::derive(&request.output));
    let implicit_outputs: Vec<PathBuf> = match &coverage {
        Some(artifact) => {
            rustc_flags.push(artifact.profile_emit_flag(templates.profile_emit_prefix()));
            vec![artifact.notes.clone()]
        }
        None => Vec::new(),
    };

    let rustc_flags = flags::join(&rustc_flags);
    let lib_flags = flags::join(&linked.lib_flags);
    let inputs = vec![request.main_src.clone()];
    let src = request.main_src.display();

    let lint = flags.clippy.then(|| BuildAction {
        rule: Rule::Lint,
        description: format!("{} {src}", Rule::Lint.verb()),
        output: lint_marker(&request.output),
        implicit_outputs: Vec::new(),
        inputs: inputs.clone(),
        implicits: implicits.clone(),
        args: BTreeMap::from([
            (arg::RUSTC_FLAGS.to_owned(), rustc_flags.clone()),
            (arg::LIB_FLAGS.to_owned(), lib_flags.clone()),
            (arg::CLIPPY_FLAGS.to_owned(), flags::join(&flags.clippy_flags)),
        ]),
    });
    // Ordering edge only: the compile step never reads the marker.
    if let Some(lint) = &lint {
        implicits.push(lint.output.clone());
    }

    let (crt_begin, crt_end) = match &deps.crt {
        Some(crt) => (crt.begin.display().to_string(), crt.end.display().to_string()),
        None => (String::new(), String::new()),
    };
    let compile = BuildAction {
        rule: Rule::Compile,
        description: format!("{} {src}", Rule::Compile.verb()),
        output: request.output.clone(),
        implicit_outputs,
        inputs,
        implicits,
        args: BTreeMap::from([
            (arg::RUSTC_FLAGS.to_owned(), rustc_flags),
            (arg::LINK_FLAGS.to_owned(), flags::join(&link_flags)),
            (arg::LIB_FLAGS.to_owned(), lib_flags),
            (arg::CRT_BEGIN.to_owned(), crt_begin),
            (arg::CRT_END.to_owned(), crt_end),
        ]),
    };

    debug!(
        kind = %request.crate_kind,
        output = %request.output.display(),
        implicits = compile.implicits.len(),
        lint = lint.is_some(),
        coverage = coverage.is_some(),
        "synthesized crate actions"
    );

    CrateActions {
        lint,
        compile,
        output: BuildOutput {
            output_file: request.output.clone(),
            coverage,
        },
    }
}
