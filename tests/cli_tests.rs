#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{fixture, Workspace};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn layergen(ws: &Workspace, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_layergen"))
        .args(args)
        .current_dir(ws.root())
        .env_remove("LAYERGEN_BUNDLER_BIN")
        .env("LAYERGEN_LOG_LEVEL", "warn")
        .output()
        .unwrap()
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn test_generate_all_succeeds() {
    let scenarios = fixture("scenarios.yaml");
    let billing = fixture("billing.yaml");
    let ws = Workspace::new(&[("scenarios", &scenarios), ("billing", &billing)]);
    ws.write_config("");

    let out = layergen(&ws, &["generate"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Generating 2 domain(s)"));
    assert!(ws.out().join("billing/index.ts").is_file());
    assert!(ws.out().join("scenarios/index.ts").is_file());
    assert!(ws.out().join("index.ts").is_file());
}

#[test]
fn test_failed_domain_sets_exit_status() {
    let scenarios = fixture("scenarios.yaml");
    let ws = Workspace::new(&[("scenarios", &scenarios)]);
    let config = ws.write_config("");

    let out = layergen(
        &ws,
        &["generate", "scenarios", "absent", "--config", config.to_str().unwrap()],
    );
    assert!(!out.status.success());
    let err = stderr(&out);
    assert!(err.contains("absent @ Loaded: [SpecError]"), "stderr: {err}");
    assert!(ws.out().join("scenarios/index.ts").is_file());
}

#[test]
fn test_explicit_missing_config_is_an_error() {
    let ws = Workspace::new(&[]);
    let out = layergen(&ws, &["generate", "--config", "nope.toml"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Config file not found"));
}

#[test]
fn test_only_and_output_flags() {
    let scenarios = fixture("scenarios.yaml");
    let ws = Workspace::new(&[("scenarios", &scenarios)]);
    ws.write_config("");

    let out = layergen(
        &ws,
        &["generate", "scenarios", "--only", "types,schemas", "--output", "custom"],
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let root = ws.root().join("custom/scenarios");
    assert!(root.join("types.ts").is_file());
    assert!(root.join("schemas.ts").is_file());
    assert!(!root.join("handlers").exists());
}

#[test]
fn test_inspect_prints_analysis() {
    let scenarios = fixture("scenarios.yaml");
    let ws = Workspace::new(&[("scenarios", &scenarios)]);
    ws.write_config("");

    let out = layergen(&ws, &["inspect", "scenarios"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("widget → WidgetRepository"));
    assert!(text.contains("shape=PaginatedItems(Widget)"));
    assert!(text.contains("SchemaMismatch"));
    assert!(!ws.out().exists());
}

#[cfg(unix)]
fn stub(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

#[cfg(unix)]
const BUNDLER_CONFIG: &str = r#"
[bundler]
enabled = true
command = "/nonexistent/bundler"
args = ["{input}", "{output}"]
timeout_secs = 10
"#;

#[cfg(unix)]
#[test]
fn test_bundled_document_is_loaded() {
    let ws = Workspace::new(&[("tiny", "openapi: 3.0.3\n")]);
    ws.write_config(BUNDLER_CONFIG);
    let bin = stub(
        ws.root(),
        "bundler",
        r#"printf '%s' '{"openapi":"3.0.3","info":{"title":"Tiny","version":"1"},"paths":{}}' > "$2""#,
    );

    let out = Command::new(env!("CARGO_BIN_EXE_layergen"))
        .args(["generate", "tiny"])
        .current_dir(ws.root())
        .env("LAYERGEN_BUNDLER_BIN", &bin)
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(ws.out().join(".bundled/tiny.json").is_file());
    assert!(ws.out().join("tiny/index.ts").is_file());
}

#[cfg(unix)]
#[test]
fn test_bundler_failure_fails_the_domain() {
    let ws = Workspace::new(&[("tiny", "openapi: 3.0.3\ninfo: {title: T, version: '1'}\npaths: {}\n")]);
    ws.write_config(BUNDLER_CONFIG);
    let bin = stub(ws.root(), "bundler", "exit 2");

    let out = Command::new(env!("CARGO_BIN_EXE_layergen"))
        .args(["generate", "tiny"])
        .current_dir(ws.root())
        .env("LAYERGEN_BUNDLER_BIN", &bin)
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(stderr(&out).contains("[BundlingFailure]"));

    // --no-bundle reads the spec directly
    let out = Command::new(env!("CARGO_BIN_EXE_layergen"))
        .args(["generate", "tiny", "--no-bundle"])
        .current_dir(ws.root())
        .env("LAYERGEN_BUNDLER_BIN", &bin)
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));
}
