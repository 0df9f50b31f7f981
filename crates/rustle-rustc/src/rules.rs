//! Fixed command templates for the compile, lint, and archive rules.
//!
//! Templates use ninja variable syntax: `$in`, `$out`, and `${name}` for a
//! named action argument. They are expanded once per [`RuleTemplates`] and
//! shared read-only by every action synthesized afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// The rule an action is executed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rule {
    Compile,
    Lint,
    Archive,
}

impl Rule {
    /// Every rule, in the order they are declared in a generated graph.
    pub const ALL: [Rule; 3] = [Rule::Compile, Rule::Lint, Rule::Archive];

    /// The rule identifier handed to the build graph.
    pub fn name(self) -> &'static str {
        match self {
            Rule::Compile => "compile",
            Rule::Lint => "lint",
            Rule::Archive => "archive",
        }
    }

    /// Short verb used in progress descriptions (`rustc src/lib.rs`).
    pub fn verb(self) -> &'static str {
        match self {
            Rule::Compile => "rustc",
            Rule::Lint => "clippy",
            Rule::Archive => "zip",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Names of the action arguments the templates reference.
pub mod arg {
    pub const RUSTC_FLAGS: &str = "rustc_flags";
    pub const LINK_FLAGS: &str = "link_flags";
    pub const LIB_FLAGS: &str = "lib_flags";
    pub const CLIPPY_FLAGS: &str = "clippy_flags";
    pub const CRT_BEGIN: &str = "crt_begin";
    pub const CRT_END: &str = "crt_end";
}

/// Everything a build graph needs to declare one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleParams<'a> {
    pub command: &'a str,
    /// Dependency file the command writes for the graph's own tracking.
    pub depfile: Option<&'static str>,
    /// Format of `depfile`.
    pub deps: Option<&'static str>,
    pub rspfile: Option<&'static str>,
    pub rspfile_content: Option<&'static str>,
    /// Tool binaries every action of this rule implicitly depends on.
    pub command_deps: Vec<&'a Path>,
}

/// The immutable rule-template registry.
///
/// Built once before any action is synthesized and passed by reference into
/// every builder call. It holds no interior mutability, so concurrent readers
/// need no synchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTemplates {
    rustc: PathBuf,
    clippy_driver: PathBuf,
    zip: PathBuf,
    profile_emit_prefix: String,
    compile: String,
    lint: String,
    archive: String,
}

impl RuleTemplates {
    /// Start building templates from the default tool names.
    pub fn builder() -> RuleTemplatesBuilder {
        RuleTemplatesBuilder::default()
    }

    /// Prefix for `-Z profile-emit=` paths, without a trailing slash.
    pub fn profile_emit_prefix(&self) -> &str {
        &self.profile_emit_prefix
    }

    /// The unexpanded command template of `rule`.
    pub fn command(&self, rule: Rule) -> &str {
        match rule {
            Rule::Compile => &self.compile,
            Rule::Lint => &self.lint,
            Rule::Archive => &self.archive,
        }
    }

    /// The full declaration of `rule`.
    pub fn params(&self, rule: Rule) -> RuleParams<'_> {
        let command = self.command(rule);
        match rule {
            Rule::Compile => RuleParams {
                command,
                depfile: Some("$out.d"),
                deps: Some("gcc"),
                rspfile: None,
                rspfile_content: None,
                command_deps: vec![self.rustc.as_path()],
            },
            Rule::Lint => RuleParams {
                command,
                depfile: None,
                deps: None,
                rspfile: None,
                rspfile_content: None,
                command_deps: vec![self.clippy_driver.as_path()],
            },
            Rule::Archive => RuleParams {
                command,
                depfile: None,
                deps: None,
                rspfile: Some("$out.rsp"),
                rspfile_content: Some("$in"),
                command_deps: vec![self.zip.as_path()],
            },
        }
    }

    /// Expand `rule`'s template into the command line the build graph runs.
    ///
    /// `$in` becomes the space-joined inputs, `$out` the output, and any other
    /// variable the matching entry of `args` (empty when absent).
    pub fn render(
        &self,
        rule: Rule,
        inputs: &[PathBuf],
        output: &Path,
        args: &BTreeMap<String, String>,
    ) -> String {
        expand(self.command(rule), |name| match name {
            "in" => inputs
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(" "),
            "out" => output.display().to_string(),
            other => args.get(other).cloned().unwrap_or_default(),
        })
    }
}

impl Default for RuleTemplates {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`RuleTemplates`].
#[derive(Debug, Clone)]
pub struct RuleTemplatesBuilder {
    rustc: PathBuf,
    clippy_driver: PathBuf,
    linker: PathBuf,
    linker_args: Vec<String>,
    zip: PathBuf,
    profile_emit_prefix: String,
    archive_root: PathBuf,
}

/// Tool locations used when nothing is configured.
pub mod defaults {
    pub const RUSTC: &str = "rustc";
    pub const CLIPPY_DRIVER: &str = "clippy-driver";
    pub const LINKER: &str = "cc";
    pub const ZIP: &str = "soong_zip";
    pub const PROFILE_EMIT_PREFIX: &str = "/proc/self/cwd";
    pub const ARCHIVE_ROOT: &str = "out";
}

impl Default for RuleTemplatesBuilder {
    fn default() -> Self {
        Self {
            rustc: PathBuf::from(defaults::RUSTC),
            clippy_driver: PathBuf::from(defaults::CLIPPY_DRIVER),
            linker: PathBuf::from(defaults::LINKER),
            linker_args: Vec::new(),
            zip: PathBuf::from(defaults::ZIP),
            profile_emit_prefix: defaults::PROFILE_EMIT_PREFIX.to_owned(),
            archive_root: PathBuf::from(defaults::ARCHIVE_ROOT),
        }
    }
}

impl RuleTemplatesBuilder {
    /// Set the rustc binary.
    pub fn rustc(mut self, path: &Path) -> Self {
        self.rustc = path.to_path_buf();
        self
    }

    /// Set the clippy-driver binary.
    pub fn clippy_driver(mut self, path: &Path) -> Self {
        self.clippy_driver = path.to_path_buf();
        self
    }

    /// Set the linker rustc is told to use.
    pub fn linker(mut self, path: &Path) -> Self {
        self.linker = path.to_path_buf();
        self
    }

    /// Set the fixed linker arguments placed between the startup object and
    /// the per-unit link flags.
    ///
    /// A `$` stays literal in the rendered command; the arguments sit inside
    /// double quotes there, so shell expansion still needs a `\` in front.
    pub fn linker_args(mut self, args: &[String]) -> Self {
        self.linker_args = args.to_vec();
        self
    }

    /// Set the zip tool used by the archive rule.
    pub fn zip(mut self, path: &Path) -> Self {
        self.zip = path.to_path_buf();
        self
    }

    /// Set the `-Z profile-emit=` prefix. A trailing slash is dropped.
    pub fn profile_emit_prefix(mut self, prefix: &str) -> Self {
        self.profile_emit_prefix = prefix.trim_end_matches('/').to_owned();
        self
    }

    /// Set the directory archive members are stored relative to.
    pub fn archive_root(mut self, path: &Path) -> Self {
        self.archive_root = path.to_path_buf();
        self
    }

    /// Expand the three rule templates.
    ///
    /// Configured values are escaped so none of them is read as a template
    /// variable, and tool paths containing whitespace are single-quoted.
    pub fn build(self) -> RuleTemplates {
        let linker_args: Vec<String> =
            self.linker_args.iter().map(|a| escape_value(a)).collect();
        let compile = format!(
            "{rustc} -C linker={linker} \
             -C link-args=\"${{crt_begin}} {linker_args} ${{link_flags}} ${{crt_end}}\" \
             --emit link -o $out --emit dep-info=$out.d $in ${{lib_flags}} ${{rustc_flags}}",
            rustc = shell_word(&self.rustc),
            linker = shell_word(&self.linker),
            linker_args = linker_args.join(" "),
        );
        // clippy-driver runs rustc as its backend and must produce some output;
        // metadata is the smallest.
        let lint = format!(
            "{clippy} --emit metadata -o $out $in \
             ${{lib_flags}} ${{rustc_flags}} ${{clippy_flags}}",
            clippy = shell_word(&self.clippy_driver),
        );
        let archive = format!(
            "cat $out.rsp | tr ' ' '\\n' | tr -d \\' | sort -u > ${{out}}.tmp && \
             {zip} -o ${{out}} -C {root} -l ${{out}}.tmp",
            zip = shell_word(&self.zip),
            root = shell_word(&self.archive_root),
        );

        RuleTemplates {
            rustc: self.rustc,
            clippy_driver: self.clippy_driver,
            zip: self.zip,
            profile_emit_prefix: self.profile_emit_prefix,
            compile,
            lint,
            archive,
        }
    }
}

/// Escape `$` so a value reaches the command line unchanged, both through
/// [`RuleTemplates::render`] and through ninja.
pub fn escape_value(value: &str) -> String {
    value.replace('$', "$$")
}

/// A configured path as a single shell word, escaped for the template.
///
/// Paths with whitespace or quotes are single-quoted. A `$` is left to the
/// shell, so `$OUT_DIR` expands when the command runs.
fn shell_word(path: &Path) -> String {
    let text = path.display().to_string();
    if text.chars().any(|c| c.is_whitespace() || c == '\'' || c == '"') {
        escape_value(&format!("'{}'", text.replace('\'', r"'\''")))
    } else {
        escape_value(&text)
    }
}

/// Expand ninja-style variables in `template`.
///
/// `$$` is a literal `$`. A `$` not followed by a variable is kept as is.
fn expand(template: &str, lookup: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('$') => {
                chars.next();
                out.push('$');
            }
            Some('{') => {
                chars.next();
                let name: String = chars.by_ref().take_while(|&c| c != '}').collect();
                out.push_str(&lookup(&name));
            }
            Some(c) if is_var_char(c) => {
                let mut name = String::new();
                while let Some(&next) = chars.peek() {
                    if !is_var_char(next) {
                        break;
                    }
                    name.push(next);
                    chars.next();
                }
                out.push_str(&lookup(&name));
            }
            _ => out.push('$'),
        }
    }

    out
}

fn is_var_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}
