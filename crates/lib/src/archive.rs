//! Unpacking of `.tar.gz` source archives into fresh working directories.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ArchiveError {
  #[error("failed to unpack {archive}: {source}")]
  Unpack {
    archive: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to prepare {path}: {source}")]
  Prepare {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Remove `path` and everything below it, if it exists.
pub fn clear_dir(path: &Path) -> Result<(), ArchiveError> {
  match fs::remove_dir_all(path) {
    Ok(()) => Ok(()),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
    Err(source) => Err(ArchiveError::Prepare {
      path: path.to_path_buf(),
      source,
    }),
  }
}

/// Unpack `archive` into `dest`, replacing whatever was there.
///
/// Source tarballs wrap everything in one top-level directory
/// (`openssl-1.0.2h/`). When that is the case its contents are moved up so
/// `dest` itself is the source root.
pub fn unpack_source(archive: &Path, dest: &Path) -> Result<(), ArchiveError> {
  debug!(archive = ?archive, dest = ?dest, "unpacking source");

  let prepare_err = |source| ArchiveError::Prepare {
    path: dest.to_path_buf(),
    source,
  };
  let unpack_err = |source| ArchiveError::Unpack {
    archive: archive.to_path_buf(),
    source,
  };

  clear_dir(dest)?;
  fs::create_dir_all(dest).map_err(prepare_err)?;

  let file = File::open(archive).map_err(unpack_err)?;
  let mut tar = Archive::new(GzDecoder::new(BufReader::new(file)));
  tar.unpack(dest).map_err(unpack_err)?;

  unhoist(dest).map_err(prepare_err)
}

fn unhoist(dest: &Path) -> io::Result<()> {
  let entries: Vec<_> = fs::read_dir(dest)?.collect::<Result<_, _>>()?;
  let [only] = entries.as_slice() else {
    return Ok(());
  };
  if !only.file_type()?.is_dir() {
    return Ok(());
  }

  // Renamed first so a child sharing the wrapper's name can move into place.
  let inner = dest.join(".libforge-unhoist");
  fs::rename(only.path(), &inner)?;
  debug!(dir = ?only.path(), "moving single top-level directory up");
  for entry in fs::read_dir(&inner)? {
    let entry = entry?;
    fs::rename(entry.path(), dest.join(entry.file_name()))?;
  }
  fs::remove_dir(&inner)
}
