use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn shows_artifact_paths_and_state() {
  let env = TestEnv::with_platforms(&["linux-x86_64", "android-armeabi-v7a", "ios"]);
  env.touch("root/linux-x86_64/lib/libcrypto.a");

  env
    .cmd()
    .arg("platforms")
    .assert()
    .success()
    .stdout(predicate::str::contains("linux-x86_64"))
    .stdout(predicate::str::contains("libcrypto.a (built)"))
    .stdout(predicate::str::contains("libsqlite4java-linux-amd64.so (missing)"))
    .stdout(predicate::str::contains("libsqlite4java-android.so (missing)"))
    .stdout(predicate::str::contains("package-ios"));
}

#[test]
fn json_skips_steps_that_do_not_apply() {
  let env = TestEnv::with_platforms(&["linux-x86_64", "ios"]);

  let output = env.cmd().args(["platforms", "-o", "json"]).output().unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let rows = json.as_array().unwrap();
  assert_eq!(rows.len(), 2);

  let steps = |row: &serde_json::Value| -> Vec<String> {
    row["artifacts"]
      .as_array()
      .unwrap()
      .iter()
      .map(|a| a["step"].as_str().unwrap().to_string())
      .collect()
  };

  assert_eq!(rows[0]["platform"], "linux-x86_64");
  assert_eq!(steps(&rows[0]), ["build-openssl", "build-sqlcipher", "build-sqlite4java"]);
  assert_eq!(rows[1]["platform"], "ios");
  assert_eq!(steps(&rows[1]), ["build-openssl", "build-sqlcipher", "package-ios"]);
  assert_eq!(rows[1]["artifacts"][2]["built"], false);
}
