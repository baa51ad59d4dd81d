use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn run_creates_layout_for_each_platform() {
  let env = TestEnv::with_platforms(&["linux-x86_64", "android-x86"]);

  env
    .cmd()
    .args(["run", "create-platform-dirs"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Tasks run: 2"));

  let root = env.root();
  for dir in ["src", "build", "root", "output", "output/android", "output/ios"] {
    assert!(root.join(dir).is_dir(), "missing {dir}");
  }
  for platform in ["linux-x86_64", "android-x86"] {
    assert!(root.join("build").join(platform).is_dir());
    assert!(root.join("root").join(platform).is_dir());
  }
}

#[test]
fn prebuilt_artifacts_skip_every_build_step() {
  let env = TestEnv::with_platforms(&["linux-x86_64"]);
  for archive in ["openssl", "sqlcipher", "sqlite4java"] {
    env.touch(format!("src/{archive}.tar.gz"));
  }
  env.touch("root/linux-x86_64/lib/libcrypto.a");
  env.touch("root/linux-x86_64/lib/libsqlcipher.a");
  env.touch("output/libsqlite4java-linux-amd64.so");

  env
    .cmd()
    .arg("run")
    .assert()
    .success()
    .stdout(predicate::str::contains("'all' finished"))
    .stderr(predicate::str::contains("artifact present, skipping build"))
    .stderr(predicate::str::contains("source archive already present"));

  assert_eq!(
    std::fs::read(env.root().join("output/libsqlite4java-linux-amd64.so")).unwrap(),
    b"prebuilt"
  );
}

#[test]
fn run_json_lists_executed_tasks_in_order() {
  let env = TestEnv::with_platforms(&["linux-x86_64"]);

  let output = env
    .cmd()
    .args(["--output", "json", "run", "create-platform-dirs"])
    .output()
    .unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["task"], "create-platform-dirs");
  assert_eq!(json["platforms"], serde_json::json!(["linux-x86_64"]));
  assert_eq!(
    json["executed"],
    serde_json::json!(["create-work-dirs", "create-platform-dirs"])
  );
}

#[test]
fn unknown_task_fails() {
  let env = TestEnv::with_platforms(&["linux-x86_64"]);

  env
    .cmd()
    .args(["run", "build-everything"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("no task named 'build-everything'"));
}

#[test]
fn verbose_enables_debug_logging() {
  let env = TestEnv::with_platforms(&["linux-x86_64"]);

  env
    .cmd()
    .args(["-v", "run", "create-work-dirs"])
    .assert()
    .success()
    .stderr(predicate::str::contains("creating directory"));
}
