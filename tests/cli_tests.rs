//! Integration tests for the depwalk CLI
//!
//! These tests run the actual CLI binary and verify output.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Get the binary to test
fn depwalk_cmd() -> Command {
    let mut cmd = Command::cargo_bin("depwalk").unwrap();
    cmd.env_remove("DEPWALK_PARALLEL_LIMIT");
    cmd
}

fn write_project(dir: &TempDir, yaml: &str) -> PathBuf {
    let path = dir.path().join("project.yaml");
    fs::write(&path, yaml).unwrap();
    path
}

const STACK: &str = r#"
units:
  web:
    image: nginx
    depends_on: [api]
  api:
    image: app
    depends_on:
      db: {}
      cache:
        required: false
  db:
    image: postgres
  cache:
    image: redis
"#;

#[test]
fn test_help_flag() {
    depwalk_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Dependency-ordered traversal of unit graphs",
        ));
}

#[test]
fn test_plan_help() {
    depwalk_cmd()
        .args(["plan", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--reverse"))
        .stdout(predicate::str::contains("--max-concurrency"));
}

// ============================================================================
// check
// ============================================================================

#[test]
fn test_check_valid_project() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_project(&temp_dir, STACK);

    depwalk_cmd()
        .args(["check", file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"))
        .stdout(predicate::str::contains("Units: 4"))
        .stdout(predicate::str::contains("cache -> db -> api -> web"));
}

#[test]
fn test_check_reports_cycle() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_project(
        &temp_dir,
        r#"
units:
  a:
    depends_on: [b]
  b:
    depends_on: [a]
"#,
    );

    depwalk_cmd()
        .args(["check", file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("DEPWALK-020"))
        .stderr(predicate::str::contains("a -> b -> a"));
}

#[test]
fn test_check_reports_disabled_dependency() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_project(
        &temp_dir,
        r#"
units:
  web:
    depends_on: [debug]
disabled:
  debug:
    profiles: [dev]
"#,
    );

    depwalk_cmd()
        .args(["check", file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("enable it with profile(s) 'dev'"))
        .stderr(predicate::str::contains("Fix:"));
}

#[test]
fn test_check_missing_file() {
    depwalk_cmd()
        .args(["check", "/nonexistent/project.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("DEPWALK-002"));
}

#[test]
fn test_check_invalid_yaml() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_project(&temp_dir, "units: [");

    depwalk_cmd()
        .args(["check", file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("DEPWALK-001"));
}

// ============================================================================
// plan
// ============================================================================

#[test]
fn test_plan_forward_order() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_project(&temp_dir, STACK);

    depwalk_cmd()
        .args(["plan", file.to_str().unwrap(), "-j", "1"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"(?s)db.*api.*web").unwrap())
        .stdout(predicate::str::contains("[4/4]"));
}

#[test]
fn test_plan_reverse_order() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_project(&temp_dir, STACK);

    depwalk_cmd()
        .args(["plan", file.to_str().unwrap(), "--reverse"])
        .assert()
        .success()
        .stdout(predicate::str::contains("inverse"))
        .stdout(predicate::str::is_match(r"(?s)web.*api.*db").unwrap());
}

#[test]
fn test_plan_from_subset_lists_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_project(&temp_dir, STACK);

    depwalk_cmd()
        .args(["plan", file.to_str().unwrap(), "--from", "db"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"(?s)db.*api.*web").unwrap())
        .stdout(predicate::str::contains("[3/4]"))
        .stdout(predicate::str::contains("Skipped:"))
        .stdout(predicate::str::contains("[4/4]").not());
}

#[test]
fn test_plan_unknown_start_unit() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_project(&temp_dir, STACK);

    depwalk_cmd()
        .args(["plan", file.to_str().unwrap(), "--from", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("DEPWALK-012"));
}

#[test]
fn test_plan_rejects_bad_parallel_limit() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_project(&temp_dir, STACK);

    depwalk_cmd()
        .env("DEPWALK_PARALLEL_LIMIT", "many")
        .args(["plan", file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("DEPWALK_PARALLEL_LIMIT"));
}

#[test]
fn test_plan_prints_event_log() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_project(&temp_dir, STACK);

    depwalk_cmd()
        .args(["plan", file.to_str().unwrap(), "--events"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"type\": \"walk_started\""))
        .stdout(predicate::str::contains("\"type\": \"walk_completed\""));
}
