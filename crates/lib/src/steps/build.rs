//! The generic per-platform build loop shared by every build step.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::StepEnv;
use crate::archive::{clear_dir, unpack_source};
use crate::artifact::Artifact;
use crate::command::CommandSpec;
use crate::error::StepError;
use crate::platform::Platform;
use crate::platform::profile::{PlatformEnv, profile};
use crate::sources::archive_path;
use crate::stage::{promote_file, promote_tree};
use crate::task::{Task, TaskInfo};
use crate::template::Template;

/// How a finished build's output reaches the artifact path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Promotion {
  /// Move an installed tree into `final_root`. The artifact must lie under
  /// `final_root`; it is moved after everything else.
  Tree { staged_root: PathBuf, final_root: PathBuf },
  /// Move one produced file to the artifact path.
  File { staged: PathBuf },
}

/// Directories prepared for one platform's build.
#[derive(Debug, Clone)]
pub struct Workspace {
  pub platform: Platform,
  /// Freshly unpacked sources, `<root>/build/<platform>/<item>`.
  pub source_dir: PathBuf,
  /// Empty install directory, `<root>/build/<platform>/<item>.stage`.
  pub stage_dir: PathBuf,
}

/// The platform-specific part of a build step.
pub trait Recipe {
  /// Name of the thing being built; names the working directory.
  fn item(&self) -> &str;

  /// Key of the source archive to unpack, if any.
  fn source_key(&self) -> Option<&str>;

  /// Why this recipe does not apply to `platform`, or `None` if it does.
  fn skip_reason(&self, _platform: &Platform) -> Option<&'static str> {
    None
  }

  fn artifact(&self, platform: &Platform) -> Result<Artifact, StepError>;

  /// Run the build in `work` and say where its output went.
  fn build(&self, env: &StepEnv, work: &Workspace) -> Result<Promotion, StepError>;
}

/// A task that runs a [`Recipe`] for each configured platform, skipping
/// platforms whose artifact already exists.
pub struct BuildTask<R> {
  info: TaskInfo,
  recipe: R,
}

impl<R: Recipe> BuildTask<R> {
  pub fn new(info: TaskInfo, recipe: R) -> Self {
    Self { info, recipe }
  }

  fn build_platform(&self, env: &StepEnv, platform: &Platform, artifact: &Artifact) -> Result<(), StepError> {
    let layout = env.ctx().layout();
    let probe = env.probe();
    let item = self.recipe.item();

    let work_root = layout.platform_build_dir(platform);
    let work = Workspace {
      platform: platform.clone(),
      source_dir: work_root.join(item),
      stage_dir: work_root.join(format!("{item}.stage")),
    };

    clear_dir(&work.stage_dir)?;
    make_dir(&work.stage_dir)?;
    match self.recipe.source_key() {
      Some(key) => {
        let archive = archive_path(layout.src_dir(), key);
        if !archive.is_file() {
          return Err(StepError::MissingSource(archive));
        }
        unpack_source(&archive, &work.source_dir)?;
      }
      None => {
        clear_dir(&work.source_dir)?;
        make_dir(&work.source_dir)?;
      }
    }

    let artifact_path = probe.path(artifact)?;
    let missing = |path: PathBuf| StepError::ArtifactMissing {
      platform: platform.id(),
      path,
    };

    match self.recipe.build(env, &work)? {
      Promotion::Tree {
        staged_root,
        final_root,
      } => {
        let relative = artifact_path.strip_prefix(&final_root).map_err(|_| {
          StepError::Failed(format!(
            "{} is not under {}",
            artifact_path.display(),
            final_root.display()
          ))
        })?;
        let staged = staged_root.join(relative);
        if !staged.is_file() {
          return Err(missing(staged));
        }
        promote_tree(&staged_root, &final_root, relative)?;
      }
      Promotion::File { staged } => {
        if !staged.is_file() {
          return Err(missing(staged));
        }
        promote_file(&staged, &artifact_path)?;
      }
    }

    if !probe.exists(artifact)? {
      return Err(missing(artifact_path));
    }
    Ok(())
  }
}

impl<R: Recipe> Task<StepEnv> for BuildTask<R> {
  fn info(&self) -> &TaskInfo {
    &self.info
  }

  fn run(&self, env: &StepEnv) -> Result<(), StepError> {
    let probe = env.probe();

    for platform in env.ctx().platforms() {
      if let Some(reason) = self.recipe.skip_reason(platform) {
        info!(task = self.name(), platform = %platform, reason, "skipping platform");
        continue;
      }

      let artifact = self.recipe.artifact(platform)?;
      if probe.exists(&artifact)? {
        info!(
          task = self.name(),
          platform = %platform,
          artifact = ?probe.path(&artifact)?,
          "artifact present, skipping build"
        );
        continue;
      }

      info!(task = self.name(), platform = %platform, "building {}", artifact);
      self.build_platform(env, platform, &artifact)?;
      info!(task = self.name(), platform = %platform, "built {}", artifact);
    }
    Ok(())
  }
}

pub(crate) fn make_dir(path: &Path) -> Result<(), StepError> {
  debug!(path = ?path, "creating directory");
  fs::create_dir_all(path).map_err(|e| StepError::io(format!("creating {}", path.display()), e))
}

pub(crate) fn path_str(path: &Path) -> String {
  path.to_string_lossy().into_owned()
}

/// Profile bindings for `platform`, ready to extend with step-specific keys.
pub(crate) fn platform_bindings(env: &StepEnv, platform: &Platform) -> Result<PlatformEnv, StepError> {
  Ok(profile(platform.os()).environment(env.ctx(), platform)?)
}

/// Render `template` and write it to `dest`.
pub(crate) fn write_rendered(template: &Template, bindings: &PlatformEnv, dest: &Path) -> Result<(), StepError> {
  let text = template.render(bindings)?;
  debug!(template = template.name(), dest = ?dest, "writing rendered template");
  fs::write(dest, text).map_err(|e| StepError::io(format!("writing {}", dest.display()), e))
}

/// Write `build.sh` from `template` into the source directory and run it.
pub(crate) fn run_build_script(
  env: &StepEnv,
  work: &Workspace,
  template: &Template,
  bindings: &PlatformEnv,
) -> Result<(), StepError> {
  const SCRIPT: &str = "build.sh";
  write_rendered(template, bindings, &work.source_dir.join(SCRIPT))?;
  env.runner().run(&CommandSpec::new("bash", &work.source_dir).arg(SCRIPT))?;
  Ok(())
}
