//! Error types for rustle-rustc.

/// Errors produced while constructing rustc inputs.
///
/// Both variants are construction errors: once a [`crate::CrateKind`] or a
/// [`crate::CrtObjects`] exists, it is valid.
#[derive(Debug, thiserror::Error)]
pub enum RustcError {
    /// A crate kind string outside the closed set.
    #[error("invalid crate kind \"{value}\" — expected one of binary, rlib, dylib, staticlib, cdylib, proc-macro")]
    InvalidCrateKind { value: String },

    /// Only one of the startup/teardown objects was provided.
    #[error("{present} is set but {missing} is not — startup and teardown objects must be given together")]
    UnpairedCrtObject {
        present: &'static str,
        missing: &'static str,
    },
}
