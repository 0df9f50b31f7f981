//! Resolve a `rustle.toml` plus the toolchain config into builder inputs.

use std::path::Path;

use rustle_config::manifest::{CrateDepEntry, UnitManifest};
use rustle_config::ToolchainConfig;
use rustle_rustc::{
    CrateDep, CrateKind, CrtObjects, DependencySet, FlagConfiguration, RuleTemplates, RustcError,
};
use rustle_targets::Target;

use crate::builder::{build_crate, CompilationRequest, CrateActions};
use crate::error::EngineError;

/// Target value that resolves to the triple of the machine running rustle.
pub const HOST_TARGET: &str = "host";

/// A unit manifest validated and merged with build-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUnit {
    pub request: CompilationRequest,
    pub deps: DependencySet,
    pub flags: FlagConfiguration,
}

impl ResolvedUnit {
    /// Validate `manifest` and merge in the toolchain's global flags.
    ///
    /// `origin` names the manifest in error messages.
    ///
    /// # Errors
    /// Returns an error if the crate kind is unknown, only one of the startup
    /// objects is given, or the target is `host` on an unsupported platform.
    pub fn resolve(
        manifest: &UnitManifest,
        toolchain: &ToolchainConfig,
        origin: &Path,
    ) -> Result<Self, EngineError> {
        let invalid = |source: RustcError| EngineError::InvalidUnit {
            path: origin.display().to_string(),
            source,
        };
        let krate = &manifest.krate;
        let crate_kind = krate.kind.parse::<CrateKind>().map_err(invalid)?;
        let target = match krate.target.as_deref() {
            None | Some("") => Target::default(),
            Some(HOST_TARGET) => rustle_targets::host_target()?,
            Some(triple) => Target::new(triple),
        };
        let d = &manifest.deps;
        let crt =
            CrtObjects::from_parts(d.crt_begin.clone(), d.crt_end.clone()).map_err(invalid)?;

        Ok(Self {
            request: CompilationRequest {
                main_src: krate.src.clone(),
                crate_name: krate.name.clone(),
                crate_kind,
                target,
                link_dirs: krate.link_dirs.clone(),
                output: krate.output.clone(),
            },
            deps: DependencySet {
                rlibs: crate_deps(&d.rlibs),
                dylibs: crate_deps(&d.dylibs),
                proc_macros: crate_deps(&d.proc_macros),
                static_libs: d.static_libs.clone(),
                shared_libs: d.shared_libs.clone(),
                crt,
            },
            flags: FlagConfiguration {
                global_rustc_flags: toolchain.global_rustc_flags.clone(),
                rustc_flags: manifest.flags.rustc.clone(),
                global_link_flags: toolchain.global_link_flags.clone(),
                link_flags: manifest.flags.link.clone(),
                clippy_flags: manifest.flags.clippy.clone(),
                coverage: manifest.flags.coverage,
                clippy: manifest.flags.lint,
            },
        })
    }

    /// Synthesize this unit's actions.
    pub fn build(&self, templates: &RuleTemplates) -> CrateActions {
        build_crate(templates, &self.request, &self.deps, &self.flags)
    }
}

fn crate_deps(entries: &[CrateDepEntry]) -> Vec<CrateDep> {
    entries
        .iter()
        .map(|e| CrateDep::new(&e.name, e.path.clone()))
        .collect()
}

/// Load and resolve the unit manifest at `path`.
///
/// # Errors
/// Returns an error if the manifest cannot be read, parsed, or validated.
pub fn load_unit(path: &Path, toolchain: &ToolchainConfig) -> Result<ResolvedUnit, EngineError> {
    let manifest = UnitManifest::from_path(path)?;
    ResolvedUnit::resolve(&manifest, toolchain, path)
}

/// Build the rule-template registry from a toolchain config.
pub fn templates_from_config(config: &ToolchainConfig) -> RuleTemplates {
    RuleTemplates::builder()
        .rustc(&config.rustc)
        .clippy_driver(&config.clippy_driver)
        .linker(&config.linker)
        .linker_args(&config.linker_args)
        .zip(&config.zip)
        .profile_emit_prefix(&config.profile_emit_prefix)
        .archive_root(&config.archive_root)
        .build()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rustle_rustc::rules::arg;
    use rustle_rustc::Rule;
    use std::path::PathBuf;

    const MANIFEST: &str = r#"
[crate]
name = "app"
kind = "binary"
src = "src/main.rs"
output = "out/app"
target = "x86_64-unknown-linux-gnu"
link_dirs = ["out/lib"]

[flags]
rustc = ["-C opt-level=2"]
link = ["-Wl,--gc-sections"]
coverage = true
lint = true

[deps]
rlibs = [{ name = "util", path = "out/libutil.rlib" }]
proc_macros = [{ name = "derive", path = "out/libderive.so" }]
static_libs = ["out/libz.a"]
crt_begin = "crtbegin.o"
crt_end = "crtend.o"
"#;

    const RLIB_MANIFEST: &str =
        "[crate]\nkind = \"rlib\"\nsrc = \"lib.rs\"\noutput = \"out/libx.rlib\"\n";

    fn resolve(text: &str) -> Result<ResolvedUnit, EngineError> {
        let path = Path::new("app/rustle.toml");
        let manifest = UnitManifest::parse(text, path).unwrap();
        ResolvedUnit::resolve(&manifest, &ToolchainConfig::default(), path)
    }

    #[test]
    fn resolves_full_manifest() {
        let unit = resolve(MANIFEST).unwrap();
        assert_eq!(unit.request.crate_kind, CrateKind::Binary);
        assert_eq!(unit.request.target, Target::new("x86_64-unknown-linux-gnu"));
        assert_eq!(unit.request.link_dirs, vec![PathBuf::from("out/lib")]);
        assert_eq!(unit.deps.rlibs, vec![CrateDep::new("util", "out/libutil.rlib")]);
        assert_eq!(unit.deps.proc_macros.len(), 1);
        assert_eq!(
            unit.deps.crt,
            Some(CrtObjects {
                begin: PathBuf::from("crtbegin.o"),
                end: PathBuf::from("crtend.o"),
            })
        );
        assert!(unit.flags.coverage);
        assert!(unit.flags.clippy);
    }

    #[test]
    fn global_flags_come_from_toolchain() {
        let toolchain = ToolchainConfig {
            global_rustc_flags: vec!["-C panic=abort".to_owned()],
            global_link_flags: vec!["-nostdlib".to_owned()],
            ..ToolchainConfig::default()
        };
        let path = Path::new("rustle.toml");
        let manifest = UnitManifest::parse(MANIFEST, path).unwrap();
        let unit = ResolvedUnit::resolve(&manifest, &toolchain, path).unwrap();
        let actions = unit.build(&templates_from_config(&toolchain));
        let rustc = actions.compile.args.get(arg::RUSTC_FLAGS).unwrap();
        assert!(rustc.starts_with("-C panic=abort -C opt-level=2 -C lto --crate-type=bin"));
        assert_eq!(
            actions.compile.args.get(arg::LINK_FLAGS).unwrap(),
            "-nostdlib -Wl,--gc-sections -target x86_64-unknown-linux-gnu"
        );
    }

    #[test]
    fn invalid_kind_names_manifest() {
        let err = resolve(
            "[crate]\nkind = \"exe\"\nsrc = \"main.rs\"\noutput = \"out/main\"\n",
        )
        .unwrap_err();
        assert!(matches!(
            &err,
            EngineError::InvalidUnit { source: RustcError::InvalidCrateKind { value }, .. }
                if value == "exe"
        ));
        assert!(err.to_string().contains("app/rustle.toml"));
    }

    #[test]
    fn unpaired_crt_rejected() {
        let err = resolve(
            "[crate]\nkind = \"binary\"\nsrc = \"main.rs\"\noutput = \"out/main\"\n\
             [deps]\ncrt_end = \"crtend.o\"\n",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidUnit { source: RustcError::UnpairedCrtObject { .. }, .. }
        ));
    }

    #[test]
    fn absent_target_is_empty() {
        let unit = resolve(RLIB_MANIFEST).unwrap();
        assert!(unit.request.target.is_empty());
        assert!(unit.flags == FlagConfiguration::default());
    }

    #[test]
    fn host_target_resolves() {
        let Ok(host) = rustle_targets::host_target() else {
            return;
        };
        let unit = resolve(&format!("{RLIB_MANIFEST}target = \"host\"\n")).unwrap();
        assert_eq!(unit.request.target, host);
    }

    #[test]
    fn templates_use_configured_tools() {
        let toolchain = ToolchainConfig {
            rustc: PathBuf::from("/opt/rust/bin/rustc"),
            clippy_driver: PathBuf::from("/opt/rust/bin/clippy-driver"),
            linker: PathBuf::from("clang"),
            linker_args: vec!["-fuse-ld=lld".to_owned()],
            zip: PathBuf::from("/usr/bin/soong_zip"),
            ..ToolchainConfig::default()
        };
        let t = templates_from_config(&toolchain);
        assert!(t.command(Rule::Compile).starts_with(
            "/opt/rust/bin/rustc -C linker=clang -C link-args=\"${crt_begin} -fuse-ld=lld "
        ));
        assert!(t.command(Rule::Lint).starts_with("/opt/rust/bin/clippy-driver "));
        assert!(t.command(Rule::Archive).contains("/usr/bin/soong_zip -o ${out} -C out "));
        assert_eq!(
            t.params(Rule::Compile).command_deps,
            vec![Path::new("/opt/rust/bin/rustc")]
        );
    }

    #[test]
    fn default_config_matches_default_templates() {
        assert_eq!(
            templates_from_config(&ToolchainConfig::default()),
            RuleTemplates::default()
        );
    }

    #[test]
    fn load_unit_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rustle.toml");
        std::fs::write(&path, MANIFEST).unwrap();
        let unit = load_unit(&path, &ToolchainConfig::default()).unwrap();
        let actions = unit.build(&RuleTemplates::default());
        assert_eq!(actions.into_actions().len(), 2);
    }

    #[test]
    fn load_unit_missing_file() {
        let err = load_unit(Path::new("/nonexistent/rustle.toml"), &ToolchainConfig::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::Manifest(_)));
    }
}
