#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn rustle(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rustle"))
        .current_dir(dir)
        .env_remove("RUSTLE_LOG")
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

const APP: &str = r#"
[crate]
name = "app"
kind = "binary"
src = "src/main.rs"
output = "out/app"

[flags]
coverage = true
lint = true

[deps]
rlibs = [{ name = "util", path = "out/libutil.rlib" }]
"#;

const UTIL: &str = r#"
[crate]
name = "util"
kind = "rlib"
src = "util/lib.rs"
output = "out/libutil.rlib"

[flags]
coverage = true
"#;

#[test]
fn kinds_lists_lto_policy() {
    let dir = tempfile::tempdir().unwrap();
    let output = rustle(dir.path(), &["kinds"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert_eq!(text.lines().count(), 6);
    for line in text.lines() {
        let lto = line.ends_with("lto");
        let kind = line.split_whitespace().next().unwrap();
        assert_eq!(
            lto,
            matches!(kind, "binary" | "staticlib" | "cdylib"),
            "{line}"
        );
    }
}

#[test]
fn plan_writes_ninja_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "app.toml", APP);
    let output = rustle(dir.path(), &["plan", "app.toml"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("rule compile\n"));
    assert!(text.contains("rule lint\n"));
    assert!(text.contains(
        "build out/app.clippy: lint src/main.rs | out/libutil.rlib clippy-driver\n"
    ));
    assert!(text.contains(
        "build out/app | out/app.gcno: compile src/main.rs \
         | out/libutil.rlib out/app.clippy rustc\n"
    ));
    assert!(text.contains("-C lto --crate-type=bin --crate-name=app --sysroot=/dev/null"));
}

#[test]
fn plan_json_archives_coverage_last() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "app.toml", APP);
    write(dir.path(), "util.toml", UTIL);
    let output = rustle(
        dir.path(),
        &["plan", "util.toml", "app.toml", "--format", "json", "--coverage-zip", "out/cov"],
    );
    assert!(output.status.success(), "{}", stderr(&output));

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let actions = value.as_array().unwrap();
    let rules: Vec<&str> = actions.iter().map(|a| a["rule"].as_str().unwrap()).collect();
    assert_eq!(rules, ["compile", "lint", "compile", "archive"]);

    let archive = &actions[3];
    assert_eq!(archive["output"], "out/cov.zip");
    assert_eq!(
        archive["inputs"],
        serde_json::json!(["out/app.gcno", "out/libutil.gcno"])
    );
    assert_eq!(archive["digest"].as_str().unwrap().len(), 64);
}

#[test]
fn plan_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "app.toml", APP);
    write(dir.path(), "util.toml", UTIL);
    let args = ["plan", "app.toml", "util.toml", "--format", "json"];
    let first = stdout(&rustle(dir.path(), &args));
    let second = stdout(&rustle(dir.path(), &args));
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn plan_uses_toolchain_config() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "util.toml", UTIL);
    write(
        dir.path(),
        "tc.toml",
        "rustc = \"/opt/rust/bin/rustc\"\nprofile_emit_prefix = \"/build\"\n\
         global_rustc_flags = [\"-C panic=abort\"]\n",
    );
    let output = rustle(
        dir.path(),
        &["plan", "util.toml", "--toolchain", "tc.toml", "--format", "commands"],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert_eq!(text.lines().count(), 1);
    assert!(text.starts_with("/opt/rust/bin/rustc -C linker=cc "));
    assert!(text.contains("-o out/libutil.rlib --emit dep-info=out/libutil.rlib.d util/lib.rs"));
    assert!(text.contains("-C panic=abort --crate-type=rlib"));
    assert!(text.trim_end().ends_with("-Z profile-emit=/build/out/libutil.gcda"));
}

#[test]
fn plan_output_file() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "util.toml", UTIL);
    let output = rustle(dir.path(), &["plan", "util.toml", "-o", "build.ninja"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).is_empty());
    let written = std::fs::read_to_string(dir.path().join("build.ninja")).unwrap();
    assert!(written.contains("build out/libutil.rlib | out/libutil.gcno: compile util/lib.rs"));
}

#[test]
fn invalid_kind_fails() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "bad.toml",
        "[crate]\nkind = \"exe\"\nsrc = \"main.rs\"\noutput = \"out/main\"\n",
    );
    let output = rustle(dir.path(), &["plan", "bad.toml"]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.starts_with("error: invalid unit bad.toml"), "{err}");
    assert!(err.contains("invalid crate kind \"exe\""));
}

#[test]
fn missing_manifest_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = rustle(dir.path(), &["plan", "nope.toml"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("nope.toml"));
}

#[test]
fn archive_command() {
    let dir = tempfile::tempdir().unwrap();
    let output = rustle(
        dir.path(),
        &["archive", "--base", "cov", "b.gcno", "a.gcno", "b.gcno", "--format", "commands"],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.starts_with("cat cov.zip.rsp | tr ' ' '\\n' | tr -d \\' | sort -u > cov.zip.tmp"));
    assert!(text.contains("soong_zip -o cov.zip -C out -l cov.zip.tmp"));
}

#[test]
fn verbose_logs_to_stderr() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "util.toml", UTIL);
    let output = rustle(dir.path(), &["--verbose", "plan", "util.toml"]);
    assert!(output.status.success());
    assert!(stderr(&output).contains("synthesized crate actions"));
    assert!(stdout(&output).contains("rule compile"));
}
