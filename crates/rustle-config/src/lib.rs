//! Parse and validate `rustle.toml` unit manifests and the toolchain config.

pub mod manifest;
pub mod toolchain;

pub use manifest::UnitManifest;
pub use toolchain::ToolchainConfig;
