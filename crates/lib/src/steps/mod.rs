//! The concrete build pipeline.
//!
//! ```text
//! all
//! ├── build-sqlite4java
//! │   ├── build-sqlcipher
//! │   │   ├── build-openssl
//! │   │   │   ├── create-platform-dirs ── create-work-dirs
//! │   │   │   └── download-openssl ────── create-work-dirs
//! │   │   └── download-sqlcipher
//! │   └── download-sqlite4java
//! └── package-ios
//!     └── build-sqlcipher
//! ```
//!
//! Build tasks loop over every configured platform and skip those whose
//! artifact already exists, so re-running `all` after a failure only redoes
//! the missing work.

mod build;
mod dirs;
mod download;
mod ios;
mod openssl;
mod sqlcipher;
mod sqlite4java;

#[cfg(test)]
pub(crate) mod testutil;

pub use build::{BuildTask, Promotion, Recipe, Workspace};
pub use dirs::{create_platform_dirs, create_work_dirs};
pub use download::DownloadTask;
pub use ios::IosPackage;
pub use openssl::OpenSsl;
pub use sqlcipher::SqlCipher;
pub use sqlite4java::{Sqlite4Java, sqlite4java_variant};

use std::collections::HashMap;
use std::path::PathBuf;

use crate::artifact::ArtifactProbe;
use crate::command::CommandRunner;
use crate::context::BuildContext;
use crate::error::StepError;
use crate::fetch::Fetcher;
use crate::platform::profile::profile;
use crate::platform::{Platform, PlatformError};
use crate::sources::{SOURCES, Source};
use crate::task::{FnTask, RegistryError, Task, TaskInfo, TaskRegistry};

pub const CREATE_WORK_DIRS: &str = "create-work-dirs";
pub const CREATE_PLATFORM_DIRS: &str = "create-platform-dirs";
pub const BUILD_OPENSSL: &str = "build-openssl";
pub const BUILD_SQLCIPHER: &str = "build-sqlcipher";
pub const BUILD_SQLITE4JAVA: &str = "build-sqlite4java";
pub const PACKAGE_IOS: &str = "package-ios";
pub const ALL: &str = "all";

/// What every step runs against: the build context plus the process and
/// network seams.
pub struct StepEnv {
  ctx: BuildContext,
  runner: Box<dyn CommandRunner>,
  fetcher: Box<dyn Fetcher>,
}

impl StepEnv {
  pub fn new(ctx: BuildContext, runner: impl CommandRunner + 'static, fetcher: impl Fetcher + 'static) -> Self {
    Self {
      ctx,
      runner: Box::new(runner),
      fetcher: Box::new(fetcher),
    }
  }

  pub fn ctx(&self) -> &BuildContext {
    &self.ctx
  }

  pub fn runner(&self) -> &dyn CommandRunner {
    self.runner.as_ref()
  }

  pub fn fetcher(&self) -> &dyn Fetcher {
    self.fetcher.as_ref()
  }

  pub fn probe(&self) -> ArtifactProbe<'_> {
    ArtifactProbe::new(self.ctx.layout())
  }
}

/// Check that every configured platform can be built and that no two of them
/// would write the same artifact.
///
/// Aliases such as `linux-amd64` and `linux-x86_64`, or two macOS arches,
/// share one sqlite4java output; the second would be skipped as already
/// built.
pub fn check_platforms(ctx: &BuildContext) -> Result<(), StepError> {
  let probe = ArtifactProbe::new(ctx.layout());
  let recipes: [&dyn Recipe; 4] = [&OpenSsl, &SqlCipher, &Sqlite4Java, &IosPackage];
  let mut claimed: HashMap<PathBuf, &Platform> = HashMap::new();

  for platform in ctx.platforms() {
    profile(platform.os()).environment(ctx, platform)?;

    for recipe in recipes {
      if recipe.skip_reason(platform).is_some() {
        continue;
      }
      let path = probe.path(&recipe.artifact(platform)?)?;
      if let Some(first) = claimed.insert(path.clone(), platform) {
        return Err(
          PlatformError::Collision {
            first: first.id(),
            second: platform.id(),
            path,
          }
          .into(),
        );
      }
    }
  }
  Ok(())
}

/// Register the full pipeline: directory setup, one download task per pinned
/// source, the per-platform build steps and the `all` umbrella.
pub fn register_default_tasks(registry: &mut TaskRegistry<StepEnv>) -> Result<(), RegistryError> {
  let mut tasks: Vec<Box<dyn Task<StepEnv>>> = vec![Box::new(create_work_dirs()), Box::new(create_platform_dirs())];

  for pin in SOURCES {
    tasks.push(Box::new(DownloadTask::new(Source::from(pin))));
  }

  tasks.push(Box::new(OpenSsl::task()));
  tasks.push(Box::new(SqlCipher::task()));
  tasks.push(Box::new(Sqlite4Java::task()));
  tasks.push(Box::new(IosPackage::task()));
  tasks.push(Box::new(FnTask::group(
    TaskInfo::new(ALL, "Build every library for every configured platform")
      .depends_on(BUILD_SQLITE4JAVA)
      .depends_on(PACKAGE_IOS),
  )));

  registry.register_all(tasks)
}

/// A registry holding the default pipeline, checked for missing
/// dependencies and cycles.
pub fn default_registry() -> Result<TaskRegistry<StepEnv>, RegistryError> {
  let mut registry = TaskRegistry::new();
  register_default_tasks(&mut registry)?;
  registry.validate()?;
  Ok(registry)
}
