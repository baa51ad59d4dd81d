use tracing::info;

use super::build::{BuildTask, Promotion, Recipe, Workspace, path_str, platform_bindings};
use super::{BUILD_SQLCIPHER, BUILD_SQLITE4JAVA, StepEnv};
use crate::artifact::{Artifact, LinkMode, dynamic_lib_name};
use crate::command::CommandSpec;
use crate::error::StepError;
use crate::platform::os::Os;
use crate::platform::profile::profile;
use crate::platform::{Platform, PlatformError, PlatformKind};
use crate::sources::{SQLITE4JAVA, download_task_name};
use crate::task::TaskInfo;
use crate::template::catalogue;

/// Gant target that links the desktop JNI library.
const DESKTOP_TARGET: &str = "lib.link";
/// Gant target added by the Android patch.
const ANDROID_TARGET: &str = "sqlcipher-android";

/// The suffix sqlite4java uses in its library names, e.g. `linux-amd64` in
/// `libsqlite4java-linux-amd64.so`.
pub fn sqlite4java_variant(platform: &Platform) -> Result<&'static str, PlatformError> {
  let arch = platform.arch().unwrap_or_default();
  let variant = match (platform.os(), arch) {
    (Os::Linux, "x86_64" | "amd64") => "linux-amd64",
    (Os::Linux, "x86" | "i386" | "i686") => "linux-i386",
    (Os::Osx, _) => "osx",
    (Os::Win32, "x86_64" | "x64") => "win32-x64",
    (Os::Win32, "x86" | "i686") => "win32-x86",
    (Os::Android, _) => "android",
    _ => {
      return Err(PlatformError::unsupported(
        platform,
        "sqlite4java has no native library for this platform",
      ));
    }
  };
  Ok(variant)
}

/// The sqlite4java JNI library, linked against sqlcipher and copied into the
/// output tree. Built per platform with the project's gant scripts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite4Java;

impl Sqlite4Java {
  pub fn task() -> BuildTask<Self> {
    BuildTask::new(
      TaskInfo::new(BUILD_SQLITE4JAVA, "Build sqlite4java")
        .depends_on(BUILD_SQLCIPHER)
        .depends_on(download_task_name(SQLITE4JAVA.key)),
      Self,
    )
  }

  fn apply_patch(&self, env: &StepEnv, work: &Workspace) -> Result<(), StepError> {
    let layout = env.ctx().layout();
    let mut bindings = platform_bindings(env, &work.platform)?;

    match work.platform.kind() {
      PlatformKind::Android(abi) => {
        bindings.insert("root-prefix".to_string(), path_str(layout.prefix_dir()));
        bindings.insert("abi-list".to_string(), abi.as_str().to_string());
      }
      _ => {
        let jdk = env
          .ctx()
          .toolchains()
          .jdk_home(work.platform.os())
          .ok_or_else(|| PlatformError::unsupported(&work.platform, "no JDK configured"))?;
        bindings.insert("prefix".to_string(), path_str(&layout.platform_prefix(&work.platform)));
        bindings.insert("jdk-home".to_string(), path_str(jdk));
      }
    }

    let name = profile(work.platform.os()).patch(SQLITE4JAVA.key);
    let patch = catalogue::patch(&name)?.render(&bindings)?;
    info!(patch = %name, platform = %work.platform, "applying patch");
    env.runner().run(
      &CommandSpec::new("patch", &work.source_dir)
        .args(["-p1", "--forward"])
        .stdin(patch),
    )?;
    Ok(())
  }

  fn run_gant(&self, env: &StepEnv, work: &Workspace) -> Result<(), StepError> {
    let toolchains = env.ctx().toolchains();
    let mut spec = CommandSpec::new(path_str(&toolchains.gant_bin()), work.source_dir.join("ant"))
      .env("GROOVY_HOME", path_str(&toolchains.groovy_home))
      .arg(format!("-Dndk.home={}", path_str(&toolchains.android_ndk_home)));

    let target = match toolchains.jdk_home(work.platform.os()) {
      Some(jdk) => {
        spec = spec.arg(format!("-Djdk.home={}", path_str(jdk)));
        DESKTOP_TARGET
      }
      None => ANDROID_TARGET,
    };

    env.runner().run(&spec.arg(target))?;
    Ok(())
  }

  /// Where gant leaves the linked library.
  fn produced_library(&self, work: &Workspace) -> Result<std::path::PathBuf, StepError> {
    let build = work.source_dir.join("build");
    let variant = sqlite4java_variant(&work.platform)?;
    let file = dynamic_lib_name(&work.platform, &format!("sqlite4java-{variant}"))?;

    Ok(match work.platform.abi() {
      Some(abi) => build.join("android").join("project").join("libs").join(abi.as_str()).join(file),
      None => build.join(format!("lib.release.{variant}")).join(file),
    })
  }
}

impl Recipe for Sqlite4Java {
  fn item(&self) -> &str {
    SQLITE4JAVA.key
  }

  fn source_key(&self) -> Option<&str> {
    Some(SQLITE4JAVA.key)
  }

  fn skip_reason(&self, platform: &Platform) -> Option<&'static str> {
    (platform.kind() == PlatformKind::Ios).then_some("iOS links sqlcipher statically; see package-ios")
  }

  fn artifact(&self, platform: &Platform) -> Result<Artifact, StepError> {
    let variant = sqlite4java_variant(platform)?;
    Ok(Artifact::output(platform, format!("sqlite4java-{variant}"), LinkMode::Dynamic))
  }

  fn build(&self, env: &StepEnv, work: &Workspace) -> Result<Promotion, StepError> {
    self.apply_patch(env, work)?;
    self.run_gant(env, work)?;
    Ok(Promotion::File {
      staged: self.produced_library(work)?,
    })
  }
}
