//! Subprocess execution for external build tools.
//!
//! Build scripts, `patch` and `gant` are opaque collaborators: all the
//! orchestrator needs from them is an exit status. They run synchronously
//! with no timeout, inheriting stdout and stderr so their progress is visible.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum CommandError {
  #[error("failed to start '{command}': {source}")]
  Spawn {
    command: String,
    #[source]
    source: io::Error,
  },

  #[error("command '{command}' failed with {}", exit_status(.code))]
  Failed { command: String, code: Option<i32> },

  #[error("failed to write stdin of '{command}': {source}")]
  Stdin {
    command: String,
    #[source]
    source: io::Error,
  },
}

fn exit_status(code: &Option<i32>) -> String {
  match code {
    Some(code) => format!("exit code {code}"),
    None => "no exit code (terminated by signal)".to_string(),
  }
}

/// A fully described subprocess invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
  pub program: String,
  pub args: Vec<String>,
  pub cwd: PathBuf,
  /// Added on top of the inherited environment.
  pub env: BTreeMap<String, String>,
  /// Written to the child's stdin, which is then closed.
  pub stdin: Option<String>,
}

impl CommandSpec {
  pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      cwd: cwd.into(),
      env: BTreeMap::new(),
      stdin: None,
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.env.insert(key.into(), value.into());
    self
  }

  pub fn stdin(mut self, input: impl Into<String>) -> Self {
    self.stdin = Some(input.into());
    self
  }

  /// Program name without its directory, for matching in logs and tests.
  pub fn program_name(&self) -> &str {
    Path::new(&self.program)
      .file_name()
      .and_then(|n| n.to_str())
      .unwrap_or(&self.program)
  }
}

impl fmt::Display for CommandSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.program)?;
    for arg in &self.args {
      write!(f, " {arg}")?;
    }
    Ok(())
  }
}

/// Runs subprocesses. Swapped out in tests so no real toolchain is needed.
pub trait CommandRunner {
  fn run(&self, spec: &CommandSpec) -> Result<(), CommandError>;
}

/// Runs commands with [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
  fn run(&self, spec: &CommandSpec) -> Result<(), CommandError> {
    info!(command = %spec, cwd = ?spec.cwd, "running command");
    if !spec.env.is_empty() {
      debug!(env = ?spec.env, "command environment");
    }

    let mut command = Command::new(&spec.program);
    command.args(&spec.args).current_dir(&spec.cwd).envs(&spec.env);
    if spec.stdin.is_some() {
      command.stdin(Stdio::piped());
    }

    let mut child = command.spawn().map_err(|source| CommandError::Spawn {
      command: spec.to_string(),
      source,
    })?;

    if let Some(input) = &spec.stdin
      && let Some(mut pipe) = child.stdin.take()
      && let Err(source) = pipe.write_all(input.as_bytes())
    {
      drop(pipe);
      // Reap the child before reporting.
      let _ = child.kill();
      let _ = child.wait();
      return Err(CommandError::Stdin {
        command: spec.to_string(),
        source,
      });
    }

    let status = child.wait().map_err(|source| CommandError::Spawn {
      command: spec.to_string(),
      source,
    })?;

    if !status.success() {
      return Err(CommandError::Failed {
        command: spec.to_string(),
        code: status.code(),
      });
    }

    debug!(command = %spec, "command succeeded");
    Ok(())
  }
}
