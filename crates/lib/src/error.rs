//! Error types shared across the crate.
//!
//! Each component has its own error enum; [`StepError`] collects what a task
//! body can fail with, and [`Error`] is the top-level type returned to callers
//! of the library, classified by [`ErrorKind`].

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::archive::ArchiveError;
use crate::checksum::ChecksumError;
use crate::command::CommandError;
use crate::config::ConfigError;
use crate::fetch::FetchError;
use crate::platform::PlatformError;
use crate::task::{ExecuteError, RegistryError};
use crate::template::TemplateError;

/// Failure inside a task body.
#[derive(Debug, Error)]
pub enum StepError {
  #[error(transparent)]
  Platform(#[from] PlatformError),

  #[error(transparent)]
  Template(#[from] TemplateError),

  #[error(transparent)]
  Checksum(#[from] ChecksumError),

  #[error(transparent)]
  Fetch(#[from] FetchError),

  #[error(transparent)]
  Archive(#[from] ArchiveError),

  #[error(transparent)]
  Command(#[from] CommandError),

  #[error("build for {platform} finished but {} is missing", .path.display())]
  ArtifactMissing { platform: String, path: PathBuf },

  #[error("source archive {} is missing; run its download task first", .0.display())]
  MissingSource(PathBuf),

  #[error("{context}: {source}")]
  Io {
    context: String,
    #[source]
    source: io::Error,
  },

  #[error("{0}")]
  Failed(String),
}

impl StepError {
  pub fn io(context: impl Into<String>, source: io::Error) -> Self {
    Self::Io {
      context: context.into(),
      source,
    }
  }
}

/// Broad class of a failure, used for reporting and exit handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Bad configuration, unknown or duplicate tasks, unsupported platforms.
  Configuration,
  /// A download did not match its pinned digest.
  Integrity,
  /// A build command failed or did not produce its artifact.
  Build,
  /// The task graph contains a cycle.
  Cycle,
}

impl fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      ErrorKind::Configuration => "configuration",
      ErrorKind::Integrity => "integrity",
      ErrorKind::Build => "build",
      ErrorKind::Cycle => "cycle",
    })
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Registry(#[from] RegistryError),

  #[error(transparent)]
  Execute(#[from] ExecuteError),
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::Config(_) => ErrorKind::Configuration,
      Error::Registry(RegistryError::Cycle { .. }) => ErrorKind::Cycle,
      Error::Registry(_) => ErrorKind::Configuration,
      Error::Execute(ExecuteError::NotFound { .. }) => ErrorKind::Configuration,
      Error::Execute(ExecuteError::CyclicDependency { .. }) => ErrorKind::Cycle,
      Error::Execute(ExecuteError::TaskFailed { source, .. }) => match source {
        StepError::Platform(_) | StepError::Template(_) | StepError::MissingSource(_) => ErrorKind::Configuration,
        StepError::Checksum(ChecksumError::Mismatch { .. }) => ErrorKind::Integrity,
        _ => ErrorKind::Build,
      },
    }
  }
}
