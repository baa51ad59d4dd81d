use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn missing_config_file_names_the_path() {
  let env = TestEnv::empty();

  env
    .cmd()
    .args(["run", "create-work-dirs"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("libforge.toml"));
}

#[test]
fn missing_key_fails_before_any_task() {
  let env = TestEnv::empty();
  env.write_config(&format!(
    "root = '{}'\nplatforms = ['linux-x86_64']\n",
    env.root().display()
  ));

  env
    .cmd()
    .args(["run", "create-work-dirs"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("missing required key: android-ndk-home"));

  assert!(!env.root().exists());
}

#[test]
fn unset_variable_is_reported() {
  let env = TestEnv::empty();
  env.write_config("root = '$LIBFORGE_TEST_SURELY_UNSET'\n");

  env
    .cmd()
    .env_remove("LIBFORGE_TEST_SURELY_UNSET")
    .arg("platforms")
    .assert()
    .failure()
    .stderr(predicate::str::contains("LIBFORGE_TEST_SURELY_UNSET"));
}

#[test]
fn variables_expand_from_the_environment() {
  let env = TestEnv::with_platforms(&["linux-x86_64"]);
  let config = std::fs::read_to_string(&env.config_path).unwrap();
  let root = env.root().display().to_string();
  env.write_config(&config.replace(&format!("'{root}'"), "'$LIBFORGE_TEST_ROOT'"));

  env
    .cmd()
    .env("LIBFORGE_TEST_ROOT", env.root())
    .args(["run", "create-work-dirs"])
    .assert()
    .success();

  assert!(env.root().join("src").is_dir());
}

#[test]
fn unknown_platform_is_a_config_error() {
  let env = TestEnv::with_platforms(&["beos-x86"]);

  env
    .cmd()
    .arg("platforms")
    .assert()
    .failure()
    .stderr(predicate::str::contains("beos-x86"));
}

#[test]
fn config_flag_overrides_environment() {
  let env = TestEnv::with_platforms(&["linux-x86_64"]);

  env
    .cmd()
    .env("LIBFORGE_CONFIG", "/nonexistent/libforge.toml")
    .arg("--config")
    .arg(&env.config_path)
    .arg("platforms")
    .assert()
    .success();
}

#[test]
fn platforms_sharing_an_output_are_rejected_before_any_work() {
  let env = TestEnv::with_platforms(&["osx-x86_64", "osx-x86"]);

  env
    .cmd()
    .args(["run", "create-work-dirs"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("configuration error"))
    .stderr(predicate::str::contains(
      "platforms 'osx-x86_64' and 'osx-x86' would both build",
    ));

  assert!(!env.root().exists());
}

#[test]
fn unbuildable_arch_is_rejected_before_any_work() {
  let env = TestEnv::with_platforms(&["linux-x86_64", "linux-sparc"]);

  env
    .cmd()
    .args(["run", "create-work-dirs"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("no linux target for 'sparc'"));

  assert!(!env.root().exists());
}
