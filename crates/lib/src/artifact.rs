//! Artifact naming and the skip-if-built probe.
//!
//! An artifact is a library file at a path derived only from
//! (platform, library, link mode, stage). Its existence on disk is the only
//! record that a build step finished for a platform; there is no manifest or
//! journal, and no content hashing. A stale artifact from an older source
//! version is treated as up to date until the output tree is cleared.
//!
//! Naming policy:
//!
//! | mode    | linux / android | osx              | win32        | ios         |
//! |---------|-----------------|------------------|--------------|-------------|
//! | static  | `lib<name>.a`   | `lib<name>.a`    | `lib<name>.a`| `lib<name>.a` |
//! | dynamic | `lib<name>.so`  | `lib<name>.dylib`| `<name>.dll` | unsupported |

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::context::Layout;
use crate::platform::os::Os;
use crate::platform::{Platform, PlatformError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
  Static,
  Dynamic,
}

/// Where an artifact lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
  /// Intermediate install prefix, `<root>/root/<platform>/lib/`.
  Prefix,
  /// The stable output tree consumed downstream.
  Output,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Artifact {
  pub platform: Platform,
  pub library: String,
  pub mode: LinkMode,
  pub stage: Stage,
}

impl Artifact {
  pub fn new(platform: &Platform, library: impl Into<String>, mode: LinkMode, stage: Stage) -> Self {
    Self {
      platform: platform.clone(),
      library: library.into(),
      mode,
      stage,
    }
  }

  /// A static library installed into the platform prefix.
  pub fn prefix_static(platform: &Platform, library: impl Into<String>) -> Self {
    Self::new(platform, library, LinkMode::Static, Stage::Prefix)
  }

  /// A library in the output tree.
  pub fn output(platform: &Platform, library: impl Into<String>, mode: LinkMode) -> Self {
    Self::new(platform, library, mode, Stage::Output)
  }

  pub fn file_name(&self) -> Result<String, PlatformError> {
    lib_file_name(&self.platform, &self.library, self.mode)
  }
}

impl fmt::Display for Artifact {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mode = match self.mode {
      LinkMode::Static => "static",
      LinkMode::Dynamic => "dynamic",
    };
    write!(f, "{} ({mode}, {})", self.library, self.platform)
  }
}

pub fn static_lib_name(library: &str) -> String {
  format!("lib{library}.a")
}

pub fn dynamic_lib_name(platform: &Platform, library: &str) -> Result<String, PlatformError> {
  match platform.os() {
    os if os.is_linux_family() => Ok(format!("lib{library}.so")),
    Os::Osx => Ok(format!("lib{library}.dylib")),
    Os::Win32 => Ok(format!("{library}.dll")),
    _ => Err(PlatformError::unsupported(
      platform,
      "dynamic libraries are not produced for this platform",
    )),
  }
}

pub fn lib_file_name(platform: &Platform, library: &str, mode: LinkMode) -> Result<String, PlatformError> {
  match mode {
    LinkMode::Static => Ok(static_lib_name(library)),
    LinkMode::Dynamic => dynamic_lib_name(platform, library),
  }
}

/// Computes artifact paths under a [`Layout`] and checks whether they exist.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactProbe<'a> {
  layout: &'a Layout,
}

impl<'a> ArtifactProbe<'a> {
  pub fn new(layout: &'a Layout) -> Self {
    Self { layout }
  }

  /// Directory an artifact is placed in.
  pub fn dir(&self, artifact: &Artifact) -> PathBuf {
    match artifact.stage {
      Stage::Prefix => self.layout.platform_prefix(&artifact.platform).join("lib"),
      Stage::Output => self.layout.platform_output_dir(&artifact.platform),
    }
  }

  pub fn path(&self, artifact: &Artifact) -> Result<PathBuf, PlatformError> {
    Ok(self.dir(artifact).join(artifact.file_name()?))
  }

  /// Whether the artifact file is present.
  pub fn exists(&self, artifact: &Artifact) -> Result<bool, PlatformError> {
    Ok(is_file(&self.path(artifact)?))
  }
}

fn is_file(path: &Path) -> bool {
  path.metadata().map(|m| m.is_file()).unwrap_or(false)
}
