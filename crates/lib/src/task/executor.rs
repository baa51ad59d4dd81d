use std::collections::HashSet;
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use super::{Task, TaskRegistry};
use crate::error::StepError;

#[derive(Debug, Error)]
pub enum ExecuteError {
  #[error("{}", not_found_message(.name, .required_by.as_deref()))]
  NotFound { name: String, required_by: Option<String> },

  #[error("dependency cycle: {}", .path.join(" -> "))]
  CyclicDependency { path: Vec<String> },

  #[error("task '{task}' failed: {source}")]
  TaskFailed {
    task: String,
    #[source]
    source: StepError,
  },
}

fn not_found_message(name: &str, required_by: Option<&str>) -> String {
  match required_by {
    Some(parent) => format!("task '{parent}' depends on unknown task '{name}'"),
    None => format!("no task named '{name}'"),
  }
}

/// Progress within a single invocation. Never persisted.
#[derive(Debug, Default)]
pub struct RunState {
  completed: HashSet<String>,
  in_progress: Vec<String>,
}

impl RunState {
  pub fn is_completed(&self, name: &str) -> bool {
    self.completed.contains(name)
  }

  fn cycle_from(&self, name: &str) -> Option<Vec<String>> {
    let start = self.in_progress.iter().position(|n| n == name)?;
    let mut path = self.in_progress[start..].to_vec();
    path.push(name.to_string());
    Some(path)
  }
}

/// Tasks whose bodies ran, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
  pub executed: Vec<String>,
}

/// Depth-first executor over a [`TaskRegistry`].
///
/// Dependencies run in declaration order before the task that names them,
/// and each task runs at most once per [`Executor::run`] call. A failing task
/// aborts the run; tasks that already finished are not rolled back.
pub struct Executor<'r, C: ?Sized> {
  registry: &'r TaskRegistry<C>,
}

impl<'r, C: ?Sized> Executor<'r, C> {
  pub fn new(registry: &'r TaskRegistry<C>) -> Self {
    Self { registry }
  }

  /// Run `name` and its transitive dependencies.
  pub fn run(&self, name: &str, ctx: &C) -> Result<RunReport, ExecuteError> {
    let mut state = RunState::default();
    let mut report = RunReport::default();
    self.visit(name, None, &mut state, &mut |task| {
      let started = Instant::now();
      info!(task = task.name(), "starting task");
      task.run(ctx).map_err(|source| ExecuteError::TaskFailed {
        task: task.name().to_string(),
        source,
      })?;
      info!(task = task.name(), elapsed = ?started.elapsed(), "finished task");
      report.executed.push(task.name().to_string());
      Ok(())
    })?;
    Ok(report)
  }

  /// The order [`Executor::run`] would execute tasks in, without running any.
  pub fn plan(&self, name: &str) -> Result<Vec<String>, ExecuteError> {
    let mut state = RunState::default();
    let mut order = Vec::new();
    self.visit(name, None, &mut state, &mut |task| {
      order.push(task.name().to_string());
      Ok(())
    })?;
    Ok(order)
  }

  fn visit(
    &self,
    name: &str,
    required_by: Option<&str>,
    state: &mut RunState,
    on_ready: &mut dyn FnMut(&dyn Task<C>) -> Result<(), ExecuteError>,
  ) -> Result<(), ExecuteError> {
    if state.is_completed(name) {
      debug!(task = name, "already completed");
      return Ok(());
    }
    if let Some(path) = state.cycle_from(name) {
      return Err(ExecuteError::CyclicDependency { path });
    }

    let task = self.registry.get(name).ok_or_else(|| ExecuteError::NotFound {
      name: name.to_string(),
      required_by: required_by.map(str::to_string),
    })?;

    state.in_progress.push(name.to_string());
    for dep in &task.info().dependencies {
      self.visit(dep, Some(name), state, on_ready)?;
    }
    state.in_progress.pop();

    on_ready(task)?;
    state.completed.insert(name.to_string());
    Ok(())
  }
}
