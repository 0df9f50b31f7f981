//! The closed set of crate kinds a compilation unit can produce.

use std::fmt;
use std::str::FromStr;

use crate::error::RustcError;

/// What shape of artifact a compilation unit produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CrateKind {
    /// An executable.
    Binary,
    /// A static library for further linking by rustc.
    Rlib,
    /// A rustc-native dynamic library.
    Dylib,
    /// A static library for linking by a native toolchain.
    Staticlib,
    /// A C-ABI dynamic library.
    Cdylib,
    /// A compile-time code generation plugin.
    ProcMacro,
}

impl CrateKind {
    /// Every crate kind, in declaration order.
    pub const ALL: [CrateKind; 6] = [
        CrateKind::Binary,
        CrateKind::Rlib,
        CrateKind::Dylib,
        CrateKind::Staticlib,
        CrateKind::Cdylib,
        CrateKind::ProcMacro,
    ];

    /// The name used in manifests and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            CrateKind::Binary => "binary",
            CrateKind::Rlib => "rlib",
            CrateKind::Dylib => "dylib",
            CrateKind::Staticlib => "staticlib",
            CrateKind::Cdylib => "cdylib",
            CrateKind::ProcMacro => "proc-macro",
        }
    }

    /// The value rustc accepts for `--crate-type`.
    pub fn rustc_crate_type(self) -> &'static str {
        match self {
            CrateKind::Binary => "bin",
            CrateKind::Rlib => "rlib",
            CrateKind::Dylib => "dylib",
            CrateKind::Staticlib => "staticlib",
            CrateKind::Cdylib => "cdylib",
            CrateKind::ProcMacro => "proc-macro",
        }
    }

    /// Whether this kind is built with `-C lto`.
    ///
    /// Only kinds whose output is a final linked artifact get LTO; kinds that
    /// feed further rustc links do not.
    pub fn wants_lto(self) -> bool {
        match self {
            CrateKind::Binary | CrateKind::Staticlib | CrateKind::Cdylib => true,
            CrateKind::Rlib | CrateKind::Dylib | CrateKind::ProcMacro => false,
        }
    }
}

impl fmt::Display for CrateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CrateKind {
    type Err = RustcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "binary" => Ok(CrateKind::Binary),
            "rlib" => Ok(CrateKind::Rlib),
            "dylib" => Ok(CrateKind::Dylib),
            "staticlib" => Ok(CrateKind::Staticlib),
            "cdylib" => Ok(CrateKind::Cdylib),
            "proc-macro" => Ok(CrateKind::ProcMacro),
            other => Err(RustcError::InvalidCrateKind {
                value: other.to_owned(),
            }),
        }
    }
}
