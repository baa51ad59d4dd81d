use super::build::make_dir;
use super::{CREATE_PLATFORM_DIRS, CREATE_WORK_DIRS, StepEnv};
use crate::task::{FnTask, TaskInfo};

/// Creates the top-level source, build, prefix and output directories.
pub fn create_work_dirs() -> FnTask<StepEnv> {
  FnTask::new(
    TaskInfo::new(CREATE_WORK_DIRS, "Create top-level work directories"),
    |env: &StepEnv| env.ctx().layout().work_dirs().into_iter().try_for_each(make_dir),
  )
}

/// Creates `build/<platform>` and `root/<platform>` for every platform.
pub fn create_platform_dirs() -> FnTask<StepEnv> {
  FnTask::new(
    TaskInfo::new(
      CREATE_PLATFORM_DIRS,
      "Create build and prefix subdirectories for each platform",
    )
    .depends_on(CREATE_WORK_DIRS),
    |env: &StepEnv| {
      let layout = env.ctx().layout();
      for platform in env.ctx().platforms() {
        make_dir(&layout.platform_build_dir(platform))?;
        make_dir(&layout.platform_prefix(platform))?;
      }
      Ok(())
    },
  )
}
