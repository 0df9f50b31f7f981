//! rustc command-line construction: crate kinds, flag assembly, dependency
//! linking, and the fixed rule templates.

pub mod deps;
pub mod error;
pub mod flags;
pub mod kind;
pub mod rules;

pub use deps::{CrateDep, CrtObjects, DependencySet, LinkedDependencies};
pub use error::RustcError;
pub use flags::{AssembledFlags, FlagConfiguration};
pub use kind::CrateKind;
pub use rules::{Rule, RuleParams, RuleTemplates};
