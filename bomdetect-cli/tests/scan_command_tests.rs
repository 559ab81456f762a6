//! End-to-end tests for the `bomdetect` binary.
//!
//! Each test runs the compiled binary in a scratch working directory so that
//! no stray `bomdetect.toml` is picked up.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const CARGO_LOCK: &str = r#"
version = 3

[[package]]
name = "ledger"
version = "1.2.0"
dependencies = ["itoa"]

[[package]]
name = "itoa"
version = "1.0.11"
source = "registry+https://github.com/rust-lang/crates.io-index"
"#;

fn bomdetect(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bomdetect"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .env("BOMDETECT_GENERAL_LOG_LEVEL", "error")
        .output()
        .expect("binary should run")
}

fn cargo_project() -> TempDir {
    let dir = TempDir::new().expect("should create temp dir");
    std::fs::write(dir.path().join("Cargo.lock"), CARGO_LOCK).expect("should write lockfile");
    dir
}

#[test]
fn test_scan_writes_document_and_exits_zero() {
    let project = cargo_project();
    let out = TempDir::new().expect("should create temp dir");
    let project_path = project.path().to_string_lossy().into_owned();
    let out_path = out.path().to_string_lossy().into_owned();

    let output = bomdetect(
        out.path(),
        &[
            "scan",
            &project_path,
            "--output-dir",
            &out_path,
            "--project-name",
            "ledger",
            "--project-version",
            "1.2.0",
            "--output",
            "json",
        ],
    );

    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(report["exit"].as_str(), Some("success"));
    assert_eq!(report["statuses"]["cargo"].as_str(), Some("success"));
    assert!(out.path().join("cargo_ledger_1.2.0_bom.json").is_file());
}

#[test]
fn test_scan_missing_root_exits_with_search_failure() {
    let cwd = TempDir::new().expect("should create temp dir");
    let missing = cwd.path().join("does-not-exist");
    let out_path = cwd.path().join("boms").to_string_lossy().into_owned();

    let output = bomdetect(
        cwd.path(),
        &["scan", &missing.to_string_lossy(), "--output-dir", &out_path],
    );

    assert_eq!(output.status.code(), Some(6));
    assert!(!cwd.path().join("boms").exists(), "nothing should be written");
}

#[test]
fn test_scan_invalid_format_is_command_error() {
    let project = cargo_project();
    let output = bomdetect(project.path(), &["scan", ".", "--format", "swid"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid BOM format"));
}

#[test]
fn test_explicit_missing_config_is_config_error() {
    let cwd = TempDir::new().expect("should create temp dir");
    let output = bomdetect(cwd.path(), &["--config", "missing.toml", "detectors"]);

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_config_validate_reports_invalid_file() {
    let cwd = TempDir::new().expect("should create temp dir");
    std::fs::write(cwd.path().join("bomdetect.toml"), "[search]\nmax_depth = 99\n")
        .expect("should write config");

    let output = bomdetect(cwd.path(), &["config", "validate", "--output", "json"]);

    assert_eq!(output.status.code(), Some(2));
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(report["valid"].as_bool(), Some(false));
}

#[test]
fn test_detectors_lists_known_kinds() {
    let cwd = TempDir::new().expect("should create temp dir");
    let output = bomdetect(cwd.path(), &["detectors", "--output", "json"]);

    assert_eq!(output.status.code(), Some(0));
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    let kinds: Vec<&str> = report["detectors"]
        .as_array()
        .expect("detectors should be an array")
        .iter()
        .filter_map(|d| d["kind"].as_str())
        .collect();
    assert!(kinds.contains(&"cargo"));
    assert!(kinds.contains(&"sbt"));
}
