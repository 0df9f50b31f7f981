//! Library flags and implicit inputs for resolved dependencies.

use std::path::PathBuf;

use crate::error::RustcError;

/// A Rust crate dependency: the name it is imported under and its artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrateDep {
    pub crate_name: String,
    pub path: PathBuf,
}

impl CrateDep {
    pub fn new(crate_name: &str, path: impl Into<PathBuf>) -> Self {
        Self {
            crate_name: crate_name.to_owned(),
            path: path.into(),
        }
    }

    /// The `--extern` flag that makes this crate visible to rustc.
    pub fn extern_flag(&self) -> String {
        format!("--extern {}={}", self.crate_name, self.path.display())
    }
}

/// Startup and teardown objects linked around a unit's own objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrtObjects {
    pub begin: PathBuf,
    pub end: PathBuf,
}

impl CrtObjects {
    /// Pair two optional object paths.
    ///
    /// # Errors
    /// Returns an error if exactly one of `begin` and `end` is given.
    pub fn from_parts(
        begin: Option<PathBuf>,
        end: Option<PathBuf>,
    ) -> Result<Option<Self>, RustcError> {
        match (begin, end) {
            (Some(begin), Some(end)) => Ok(Some(Self { begin, end })),
            (None, None) => Ok(None),
            (Some(_), None) => Err(RustcError::UnpairedCrtObject {
                present: "crt_begin",
                missing: "crt_end",
            }),
            (None, Some(_)) => Err(RustcError::UnpairedCrtObject {
                present: "crt_end",
                missing: "crt_begin",
            }),
        }
    }
}

/// Already-resolved dependencies of one compilation unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    pub rlibs: Vec<CrateDep>,
    pub dylibs: Vec<CrateDep>,
    pub proc_macros: Vec<CrateDep>,
    /// Native static libraries, linked through the linker flags.
    pub static_libs: Vec<PathBuf>,
    /// Native shared libraries, linked through the linker flags.
    pub shared_libs: Vec<PathBuf>,
    pub crt: Option<CrtObjects>,
}

impl DependencySet {
    /// All Rust crate dependencies, in rlib, dylib, proc-macro order.
    pub fn crates(&self) -> impl Iterator<Item = &CrateDep> {
        self.rlibs
            .iter()
            .chain(&self.dylibs)
            .chain(&self.proc_macros)
    }
}

/// Output of [`link`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkedDependencies {
    /// `--extern` and `-L` flags, in that order.
    pub lib_flags: Vec<String>,
    /// Every file the compile step reads besides its sources.
    pub implicits: Vec<PathBuf>,
}

/// Turn a dependency set and the unit's link-search directories into rustc
/// library flags and the implicit inputs the build graph must track.
///
/// Search directories are not files and never become implicit inputs.
/// Native libraries become implicit inputs only; they reach the linker
/// through the link flags, not `--extern`.
pub fn link(deps: &DependencySet, link_dirs: &[PathBuf]) -> LinkedDependencies {
    let mut lib_flags: Vec<String> = deps.crates().map(CrateDep::extern_flag).collect();
    lib_flags.extend(link_dirs.iter().map(|dir| format!("-L {}", dir.display())));

    let mut implicits: Vec<PathBuf> = deps.crates().map(|dep| dep.path.clone()).collect();
    implicits.extend(deps.static_libs.iter().cloned());
    implicits.extend(deps.shared_libs.iter().cloned());
    if let Some(crt) = &deps.crt {
        implicits.push(crt.begin.clone());
        implicits.push(crt.end.clone());
    }

    LinkedDependencies {
        lib_flags,
        implicits,
    }
}
