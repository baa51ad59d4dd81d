//! Named tasks with declared prerequisites.
//!
//! A task is generic over the context it runs against, so the graph
//! machinery here knows nothing about builds, platforms or artifacts.
//!
//! - [`TaskRegistry`] owns the tasks and rejects duplicate names.
//! - [`Executor`] resolves and runs the dependency closure of one task.

mod executor;
mod registry;

pub use executor::{ExecuteError, Executor, RunReport, RunState};
pub use registry::{RegistryError, TaskRegistry};

use serde::Serialize;

use crate::error::StepError;

/// Name, description and dependency names of a task.
///
/// Dependencies are referenced by name and resolved when the graph is
/// validated or executed, so tasks may be registered in any order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskInfo {
  pub name: String,
  pub description: String,
  pub dependencies: Vec<String>,
}

impl TaskInfo {
  pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      description: description.into(),
      dependencies: Vec::new(),
    }
  }

  /// Append a dependency. Declaration order is execution order.
  pub fn depends_on(mut self, name: impl Into<String>) -> Self {
    self.dependencies.push(name.into());
    self
  }
}

/// A unit of work run at most once per invocation.
pub trait Task<C: ?Sized> {
  fn info(&self) -> &TaskInfo;

  fn run(&self, ctx: &C) -> Result<(), StepError>;

  fn name(&self) -> &str {
    &self.info().name
  }
}

/// A task whose body is a closure.
pub struct FnTask<C: ?Sized> {
  info: TaskInfo,
  body: Box<dyn Fn(&C) -> Result<(), StepError>>,
}

impl<C: ?Sized> FnTask<C> {
  pub fn new<F>(info: TaskInfo, body: F) -> Self
  where
    F: Fn(&C) -> Result<(), StepError> + 'static,
  {
    Self {
      info,
      body: Box::new(body),
    }
  }

  /// A task with no body, used to group dependencies.
  pub fn group(info: TaskInfo) -> Self {
    Self::new(info, |_| Ok(()))
  }
}

impl<C: ?Sized> Task<C> for FnTask<C> {
  fn info(&self) -> &TaskInfo {
    &self.info
  }

  fn run(&self, ctx: &C) -> Result<(), StepError> {
    (self.body)(ctx)
  }
}

impl<C: ?Sized> std::fmt::Debug for FnTask<C> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FnTask").field("info", &self.info).finish_non_exhaustive()
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn info_builder_keeps_declaration_order() {
    let info = TaskInfo::new("build-sqlcipher", "Build sqlcipher")
      .depends_on("build-openssl")
      .depends_on("download-sqlcipher");
    assert_eq!(info.dependencies, ["build-openssl", "download-sqlcipher"]);
  }

  #[test]
  fn fn_task_runs_body() {
    let task: FnTask<u32> = FnTask::new(TaskInfo::new("check", "check ctx"), |n: &u32| {
      if *n == 7 {
        Ok(())
      } else {
        Err(StepError::Failed(format!("got {n}")))
      }
    });
    assert_eq!(task.name(), "check");
    assert!(task.run(&7).is_ok());
    assert!(task.run(&8).is_err());
  }
}
