use std::fs;

use tracing::debug;

use super::build::{BuildTask, Promotion, Recipe, Workspace, path_str, platform_bindings, run_build_script};
use super::{BUILD_OPENSSL, BUILD_SQLCIPHER, StepEnv};
use crate::artifact::Artifact;
use crate::error::StepError;
use crate::platform::Platform;
use crate::platform::profile::profile;
use crate::sources::{SQLCIPHER, download_task_name};
use crate::task::TaskInfo;
use crate::template::catalogue;

/// The autoconf helpers shipped in the sqlcipher tarball predate the Android
/// and iOS host triples; fresh copies come from libtool.
const CONFIG_SCRIPTS: [&str; 2] = ["config.sub", "config.guess"];

/// Static `libsqlcipher.a`, linked against the prefix's `libcrypto.a`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlCipher;

impl SqlCipher {
  pub const LIBRARY: &'static str = "sqlcipher";

  pub fn task() -> BuildTask<Self> {
    BuildTask::new(
      TaskInfo::new(BUILD_SQLCIPHER, "Build sqlcipher")
        .depends_on(BUILD_OPENSSL)
        .depends_on(download_task_name(SQLCIPHER.key)),
      Self,
    )
  }
}

impl Recipe for SqlCipher {
  fn item(&self) -> &str {
    SQLCIPHER.key
  }

  fn source_key(&self) -> Option<&str> {
    Some(SQLCIPHER.key)
  }

  fn artifact(&self, platform: &Platform) -> Result<Artifact, StepError> {
    Ok(Artifact::prefix_static(platform, Self::LIBRARY))
  }

  fn build(&self, env: &StepEnv, work: &Workspace) -> Result<Promotion, StepError> {
    let prefix = env.ctx().layout().platform_prefix(&work.platform);

    let aux = env.ctx().toolchains().libtool_build_aux();
    for name in CONFIG_SCRIPTS {
      let from = aux.join(name);
      let to = work.source_dir.join(name);
      debug!(from = ?from, to = ?to, "copying autoconf helper");
      fs::copy(&from, &to).map_err(|e| StepError::io(format!("copying {}", from.display()), e))?;
    }

    let mut bindings = platform_bindings(env, &work.platform)?;
    bindings.insert("prefix".to_string(), path_str(&work.stage_dir));
    bindings.insert("deps-prefix".to_string(), path_str(&prefix));

    let script = catalogue::script(&profile(work.platform.os()).build_template(SQLCIPHER.key))?;
    run_build_script(env, work, &script, &bindings)?;

    Ok(Promotion::Tree {
      staged_root: work.stage_dir.clone(),
      final_root: prefix,
    })
  }
}
