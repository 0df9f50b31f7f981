//! Compiler and linker flag assembly.

use rustle_targets::Target;

use crate::kind::CrateKind;

/// Requested for crate kinds that produce a final linked artifact.
pub const LTO_FLAG: &str = "-C lto";

/// Keeps rustc from resolving an implicit system sysroot.
pub const NULL_SYSROOT_FLAG: &str = "--sysroot=/dev/null";

/// Flag lists and feature switches for one compilation unit.
///
/// Every list is kept in the order given; rustc and the linker can be
/// order-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagConfiguration {
    /// rustc flags shared by every unit in the build.
    pub global_rustc_flags: Vec<String>,
    /// rustc flags for this unit only.
    pub rustc_flags: Vec<String>,
    /// Linker flags shared by every unit in the build.
    pub global_link_flags: Vec<String>,
    /// Linker flags for this unit only.
    pub link_flags: Vec<String>,
    /// Extra flags for the clippy lint pass.
    pub clippy_flags: Vec<String>,
    /// Emit coverage instrumentation.
    pub coverage: bool,
    /// Run clippy before compiling.
    pub clippy: bool,
}

impl FlagConfiguration {
    /// Append `-C lto` to the per-unit rustc flags.
    pub fn with_lto(mut self) -> Self {
        self.rustc_flags.push(LTO_FLAG.to_owned());
        self
    }
}

/// Final rustc and linker flag sequences for one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembledFlags {
    pub rustc: Vec<String>,
    pub link: Vec<String>,
}

/// Merge global and per-unit flags with the crate-derived flags.
///
/// An empty `crate_name` omits `--crate-name`; an empty `target` omits both
/// `--target=` and the linker's `-target`.
pub fn assemble(
    flags: &FlagConfiguration,
    kind: CrateKind,
    crate_name: &str,
    target: &Target,
) -> AssembledFlags {
    let mut rustc = Vec::new();
    rustc.extend(flags.global_rustc_flags.iter().cloned());
    rustc.extend(flags.rustc_flags.iter().cloned());
    rustc.push(format!("--crate-type={}", kind.rustc_crate_type()));
    if !crate_name.is_empty() {
        rustc.push(format!("--crate-name={crate_name}"));
    }
    if !target.is_empty() {
        rustc.push(format!("--target={target}"));
    }
    rustc.push(NULL_SYSROOT_FLAG.to_owned());

    let mut link = Vec::new();
    link.extend(flags.global_link_flags.iter().cloned());
    link.extend(flags.link_flags.iter().cloned());
    if !target.is_empty() {
        link.push(format!("-target {target}"));
    }

    tracing::trace!(rustc = %join(&rustc), link = %join(&link), "assembled flags");
    AssembledFlags { rustc, link }
}

/// Join a flag sequence into the single string a rule argument expects.
pub fn join(flags: &[String]) -> String {
    flags.join(" ")
}
