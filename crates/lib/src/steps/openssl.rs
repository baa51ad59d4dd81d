use super::build::{BuildTask, Promotion, Recipe, Workspace, path_str, platform_bindings, run_build_script, write_rendered};
use super::{BUILD_OPENSSL, CREATE_PLATFORM_DIRS, StepEnv};
use crate::artifact::Artifact;
use crate::error::StepError;
use crate::platform::Platform;
use crate::platform::profile::profile;
use crate::sources::{OPENSSL, download_task_name};
use crate::task::TaskInfo;
use crate::template::catalogue;

/// Static `libcrypto.a`, installed into each platform prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenSsl;

impl OpenSsl {
  pub const LIBRARY: &'static str = "crypto";

  pub fn task() -> BuildTask<Self> {
    BuildTask::new(
      TaskInfo::new(BUILD_OPENSSL, "Build openssl")
        .depends_on(CREATE_PLATFORM_DIRS)
        .depends_on(download_task_name(OPENSSL.key)),
      Self,
    )
  }
}

impl Recipe for OpenSsl {
  fn item(&self) -> &str {
    OPENSSL.key
  }

  fn source_key(&self) -> Option<&str> {
    Some(OPENSSL.key)
  }

  fn artifact(&self, platform: &Platform) -> Result<Artifact, StepError> {
    Ok(Artifact::prefix_static(platform, Self::LIBRARY))
  }

  fn build(&self, env: &StepEnv, work: &Workspace) -> Result<Promotion, StepError> {
    let profile = profile(work.platform.os());
    let mut bindings = platform_bindings(env, &work.platform)?;
    bindings.insert("prefix".to_string(), path_str(&work.stage_dir));

    if work.platform.is_android() {
      let setenv = catalogue::script("setenv-android.sh")?;
      write_rendered(&setenv, &bindings, &work.source_dir.join("setenv-android.sh"))?;
    }

    let script = catalogue::script(&profile.build_template(OPENSSL.key))?;
    run_build_script(env, work, &script, &bindings)?;

    Ok(Promotion::Tree {
      staged_root: work.stage_dir.clone(),
      final_root: env.ctx().layout().platform_prefix(&work.platform),
    })
  }
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tracing_test::traced_test;

  use super::*;
  use crate::steps::testutil::{env, seed_sources};
  use crate::task::Task;

  #[test]
  fn builds_into_prefix() {
    let temp = tempfile::tempdir().unwrap();
    let (env, calls) = env(temp.path(), &["linux-x86_64"]);
    seed_sources(&env);

    OpenSsl::task().run(&env).unwrap();

    assert!(temp.path().join("root/linux-x86_64/lib/libcrypto.a").is_file());
    assert!(temp.path().join("root/linux-x86_64/include/crypto.h").is_file());
    assert_eq!(calls.programs(), ["bash"]);

    let script = fs::read_to_string(temp.path().join("build/linux-x86_64/openssl/build.sh")).unwrap();
    assert!(script.contains("./Configure linux-x86_64"));
    assert!(!script.contains("{{"));
  }

  #[test]
  fn android_gets_setenv_script() {
    let temp = tempfile::tempdir().unwrap();
    let (env, _calls) = env(temp.path(), &["android-armeabi-v7a"]);
    seed_sources(&env);

    OpenSsl::task().run(&env).unwrap();

    let work = temp.path().join("build/android-armeabi-v7a/openssl");
    let setenv = fs::read_to_string(work.join("setenv-android.sh")).unwrap();
    assert!(setenv.contains("_ANDROID_EABI=\"arm-linux-androideabi-4.9\""));
    assert!(setenv.contains("_ANDROID_ARCH=\"arch-arm\""));
    assert!(setenv.contains("_ANDROID_API=\"android-19\""));

    let script = fs::read_to_string(work.join("build.sh")).unwrap();
    assert!(script.contains("./Configure android-armv7"));
    assert!(temp.path().join("root/android-armeabi-v7a/lib/libcrypto.a").is_file());
  }

  #[test]
  fn present_artifact_skips_build() {
    let temp = tempfile::tempdir().unwrap();
    let (env, calls) = env(temp.path(), &["linux-x86_64"]);
    let lib = temp.path().join("root/linux-x86_64/lib/libcrypto.a");
    fs::create_dir_all(lib.parent().unwrap()).unwrap();
    fs::write(&lib, b"built earlier").unwrap();

    OpenSsl::task().run(&env).unwrap();

    assert!(calls.commands().is_empty());
    assert_eq!(fs::read(&lib).unwrap(), b"built earlier");
  }

  #[test]
  #[traced_test]
  fn skip_is_logged() {
    let temp = tempfile::tempdir().unwrap();
    let (env, _calls) = env(temp.path(), &["linux-x86_64"]);
    let lib = temp.path().join("root/linux-x86_64/lib/libcrypto.a");
    fs::create_dir_all(lib.parent().unwrap()).unwrap();
    fs::write(&lib, b"built earlier").unwrap();

    OpenSsl::task().run(&env).unwrap();
    assert!(logs_contain("artifact present, skipping build"));
    assert!(!logs_contain("building"));
  }

  #[test]
  fn missing_source_archive_fails() {
    let temp = tempfile::tempdir().unwrap();
    let (env, calls) = env(temp.path(), &["linux-x86_64"]);

    let err = OpenSsl::task().run(&env).unwrap_err();
    assert!(matches!(err, StepError::MissingSource(_)));
    assert!(calls.commands().is_empty());
  }

  #[test]
  fn failed_script_leaves_no_artifact() {
    let temp = tempfile::tempdir().unwrap();
    let (env, calls) = env(temp.path(), &["linux-x86_64"]);
    seed_sources(&env);
    calls.fail("bash");

    let err = OpenSsl::task().run(&env).unwrap_err();
    assert!(matches!(err, StepError::Command(_)));
    assert!(!temp.path().join("root/linux-x86_64/lib/libcrypto.a").exists());
  }

  #[test]
  fn first_failing_platform_stops_the_task() {
    let temp = tempfile::tempdir().unwrap();
    let (env, calls) = env(temp.path(), &["linux-x86_64", "android-x86"]);
    seed_sources(&env);
    calls.fail("bash");

    OpenSsl::task().run(&env).unwrap_err();
    assert_eq!(calls.commands().len(), 1);
    assert!(!temp.path().join("build/android-x86/openssl").exists());
  }

  #[test]
  fn script_without_output_is_detected() {
    let temp = tempfile::tempdir().unwrap();
    let (env, calls) = env(temp.path(), &["linux-x86_64"]);
    seed_sources(&env);
    calls.produce_nothing();

    let err = OpenSsl::task().run(&env).unwrap_err();
    match err {
      StepError::ArtifactMissing { platform, path } => {
        assert_eq!(platform, "linux-x86_64");
        assert!(path.ends_with("openssl.stage/lib/libcrypto.a"), "{}", path.display());
      }
      other => panic!("unexpected: {other:?}"),
    }
    assert!(!temp.path().join("root/linux-x86_64/lib/libcrypto.a").exists());
  }
}
