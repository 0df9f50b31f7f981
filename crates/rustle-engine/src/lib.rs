//! Build-action synthesis for Rust compilation units.
//!
//! A [`ResolvedUnit`] (usually loaded from a `rustle.toml`) goes through
//! [`build_crate`] to produce [`BuildAction`]s, which [`ninja::write_graph`]
//! renders for the build graph.

pub mod action;
pub mod builder;
pub mod coverage;
pub mod error;
pub mod ninja;
pub mod unit;

pub use action::BuildAction;
pub use builder::{build_crate, BuildOutput, CompilationRequest, CrateActions};
pub use coverage::CoverageArtifact;
pub use error::EngineError;
pub use unit::{load_unit, templates_from_config, ResolvedUnit};
