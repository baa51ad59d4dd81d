//! Promotion of staged build output into its final location.
//!
//! Builds install into a staging directory. Only once the build command has
//! succeeded is the output moved into the prefix or output tree, with the
//! probed artifact moved last. An interrupted build therefore never leaves a
//! file at the path the artifact probe checks.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::StepError;

/// Move a single file, creating the destination directory.
///
/// Falls back to copying when a rename crosses filesystems. The copy lands
/// beside `dest` first, so `dest` never holds a partial file.
pub fn promote_file(staged: &Path, dest: &Path) -> Result<(), StepError> {
  if let Some(parent) = dest.parent() {
    fs::create_dir_all(parent).map_err(|e| StepError::io(format!("creating {}", parent.display()), e))?;
  }

  debug!(from = ?staged, to = ?dest, "promoting file");
  move_file(staged, dest).map_err(|e| {
    StepError::io(
      format!("moving {} to {}", staged.display(), dest.display()),
      e,
    )
  })
}

fn move_file(from: &Path, to: &Path) -> io::Result<()> {
  match fs::rename(from, to) {
    Err(e) if e.kind() == io::ErrorKind::CrossesDevices => copy_then_rename(from, to),
    other => other,
  }
}

fn partial_path(to: &Path) -> PathBuf {
  let mut name = to.file_name().unwrap_or_default().to_os_string();
  name.push(".partial");
  to.with_file_name(name)
}

fn copy_then_rename(from: &Path, to: &Path) -> io::Result<()> {
  let partial = partial_path(to);
  if let Err(e) = fs::copy(from, &partial) {
    let _ = fs::remove_file(&partial);
    return Err(e);
  }
  fs::rename(&partial, to)?;
  fs::remove_file(from)
}

/// Move every file under `staged_root` to the same relative path under
/// `final_root`. The file at `artifact` (relative to both roots) goes last.
///
/// Existing files at the destination are replaced.
pub fn promote_tree(staged_root: &Path, final_root: &Path, artifact: &Path) -> Result<(), StepError> {
  let walk_err = |e: walkdir::Error| {
    let context = format!("walking {}", staged_root.display());
    match e.into_io_error() {
      Some(source) => StepError::io(context, source),
      None => StepError::Failed(format!("{context}: filesystem loop")),
    }
  };

  let mut files: Vec<PathBuf> = Vec::new();
  for entry in WalkDir::new(staged_root).sort_by_file_name() {
    let entry = entry.map_err(walk_err)?;
    if entry.file_type().is_dir() {
      continue;
    }
    let relative = entry
      .path()
      .strip_prefix(staged_root)
      .map_err(|e| StepError::Failed(e.to_string()))?
      .to_path_buf();
    files.push(relative);
  }

  if !files.iter().any(|f| f == artifact) {
    return Err(StepError::Failed(format!(
      "staged output in {} does not contain {}",
      staged_root.display(),
      artifact.display()
    )));
  }

  files.retain(|f| f != artifact);
  files.push(artifact.to_path_buf());

  debug!(from = ?staged_root, to = ?final_root, files = files.len(), "promoting tree");
  for relative in files {
    promote_file(&staged_root.join(&relative), &final_root.join(&relative))?;
  }
  Ok(())
}
