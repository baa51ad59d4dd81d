use std::collections::BTreeMap;

use super::build::{BuildTask, Promotion, Recipe, Workspace, path_str, write_rendered};
use super::{BUILD_SQLCIPHER, OpenSsl, PACKAGE_IOS, SqlCipher, StepEnv};
use crate::artifact::{Artifact, LinkMode, static_lib_name};
use crate::command::CommandSpec;
use crate::error::StepError;
use crate::platform::{Platform, PlatformKind};
use crate::task::TaskInfo;
use crate::template::catalogue;

/// Merges the iOS prefix's `libsqlcipher.a` and `libcrypto.a` into a single
/// static archive at `output/ios/libsqlcipher.a`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IosPackage;

impl IosPackage {
  const SCRIPT: &'static str = "package.sh";

  pub fn task() -> BuildTask<Self> {
    BuildTask::new(
      TaskInfo::new(PACKAGE_IOS, "Package sqlcipher and openssl into one iOS static library")
        .depends_on(BUILD_SQLCIPHER),
      Self,
    )
  }
}

impl Recipe for IosPackage {
  fn item(&self) -> &str {
    "ios-package"
  }

  fn source_key(&self) -> Option<&str> {
    None
  }

  fn skip_reason(&self, platform: &Platform) -> Option<&'static str> {
    (platform.kind() != PlatformKind::Ios).then_some("only iOS is packaged")
  }

  fn artifact(&self, platform: &Platform) -> Result<Artifact, StepError> {
    Ok(Artifact::output(platform, SqlCipher::LIBRARY, LinkMode::Static))
  }

  fn build(&self, env: &StepEnv, work: &Workspace) -> Result<Promotion, StepError> {
    let lib_dir = env.ctx().layout().platform_prefix(&work.platform).join("lib");
    let staged = work.stage_dir.join(static_lib_name(SqlCipher::LIBRARY));

    let bindings: BTreeMap<String, String> = [
      ("output", path_str(&staged)),
      ("sqlcipher-lib", path_str(&lib_dir.join(static_lib_name(SqlCipher::LIBRARY)))),
      ("crypto-lib", path_str(&lib_dir.join(static_lib_name(OpenSsl::LIBRARY)))),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    let template = catalogue::script("ios-package.sh")?;
    write_rendered(&template, &bindings, &work.source_dir.join(Self::SCRIPT))?;
    env
      .runner()
      .run(&CommandSpec::new("bash", &work.source_dir).arg(Self::SCRIPT))?;

    Ok(Promotion::File { staged })
  }
}
