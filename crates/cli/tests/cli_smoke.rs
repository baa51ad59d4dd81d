//! CLI smoke tests for libforge.
//!
//! Commands that need no configuration must work from any directory; the
//! rest must fail cleanly when the configuration is missing.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

fn libforge() -> Command {
  let mut cmd: Command = cargo_bin_cmd!("libforge");
  cmd.env_remove("LIBFORGE_CONFIG");
  cmd.env_remove("RUST_LOG");
  cmd
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  libforge()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  libforge()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("libforge"));
}

#[test]
fn subcommand_help_works() {
  for cmd in ["run", "plan", "list", "platforms"] {
    libforge()
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("Usage"));
  }
}

#[test]
fn run_help_warns_about_concurrent_runs() {
  libforge()
    .args(["run", "--help"])
    .assert()
    .success()
    .stdout(predicate::str::contains("same root directory"));
}

// =============================================================================
// list / plan (no configuration needed)
// =============================================================================

#[test]
fn list_shows_tasks_and_dependencies() {
  libforge()
    .arg("list")
    .assert()
    .success()
    .stdout(predicate::str::contains("build-sqlite4java"))
    .stdout(predicate::str::contains("build-sqlcipher, download-sqlite4java"))
    .stdout(predicate::str::contains("Download openssl"));
}

#[test]
fn list_json_is_valid() {
  let output = libforge().args(["list", "--output", "json"]).output().unwrap();
  assert!(output.status.success());

  let tasks: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let names: Vec<&str> = tasks
    .as_array()
    .unwrap()
    .iter()
    .map(|t| t["name"].as_str().unwrap())
    .collect();
  assert!(names.contains(&"all"));
  assert!(names.contains(&"package-ios"));
  assert_eq!(names.len(), 10);
}

#[test]
fn plan_defaults_to_all() {
  libforge()
    .arg("plan")
    .assert()
    .success()
    .stdout(predicate::str::contains(" 1. create-work-dirs"))
    .stdout(predicate::str::contains("10. all"));
}

#[test]
fn plan_orders_dependencies_first() {
  let output = libforge().args(["-o", "json", "plan", "build-sqlcipher"]).output().unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(
    json["order"],
    serde_json::json!([
      "create-work-dirs",
      "create-platform-dirs",
      "download-openssl",
      "build-openssl",
      "download-sqlcipher",
      "build-sqlcipher"
    ])
  );
}

#[test]
fn plan_unknown_task_fails() {
  libforge()
    .args(["plan", "deploy"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("no task named 'deploy'"));
}

// =============================================================================
// Commands needing configuration
// =============================================================================

#[test]
fn run_without_config_fails() {
  let temp = TempDir::new().unwrap();

  libforge()
    .current_dir(temp.path())
    .arg("run")
    .assert()
    .failure()
    .stderr(predicate::str::contains("libforge.toml"));
}

#[test]
fn platforms_without_config_fails() {
  let temp = TempDir::new().unwrap();

  libforge()
    .current_dir(temp.path())
    .arg("platforms")
    .assert()
    .failure();
}

#[test]
fn failure_names_the_error_kind() {
  libforge()
    .args(["plan", "deploy"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("configuration error: no task named 'deploy'"));
}
