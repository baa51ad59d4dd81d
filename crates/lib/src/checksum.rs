//! SHA-256 verification of downloaded archives.
//!
//! Guards against corrupted or tampered downloads. A file that fails
//! verification is deleted so the next run downloads it again.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ChecksumError {
  #[error("SHA-256 mismatch for {path}: expected {expected}, got {actual}")]
  Mismatch {
    path: PathBuf,
    expected: String,
    actual: String,
  },

  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// A full 64-character lowercase hex SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(pub String);

impl ContentHash {
  /// Case-insensitive comparison against a hex digest.
  pub fn matches(&self, expected: &str) -> bool {
    self.0.eq_ignore_ascii_case(expected.trim())
  }
}

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Hash a file in 8 KiB chunks.
pub fn sha256_file(path: &Path) -> Result<ContentHash, ChecksumError> {
  let read_err = |source| ChecksumError::Read {
    path: path.to_path_buf(),
    source,
  };

  let mut file = fs::File::open(path).map_err(read_err)?;
  let mut hasher = Sha256::new();
  let mut buffer = [0u8; 8192];

  loop {
    let bytes_read = file.read(&mut buffer).map_err(read_err)?;
    if bytes_read == 0 {
      break;
    }
    hasher.update(&buffer[..bytes_read]);
  }

  Ok(ContentHash(hex::encode(hasher.finalize())))
}

/// Verify `path` against `expected`, deleting the file on mismatch.
pub fn verify_file(path: &Path, expected: &str) -> Result<ContentHash, ChecksumError> {
  let actual = sha256_file(path)?;
  if actual.matches(expected) {
    debug!(path = ?path, sha256 = %actual, "checksum verified");
    return Ok(actual);
  }

  warn!(path = ?path, expected, actual = %actual, "checksum mismatch, removing file");
  if let Err(e) = fs::remove_file(path) {
    warn!(path = ?path, error = %e, "failed to remove file after checksum mismatch");
  }

  Err(ChecksumError::Mismatch {
    path: path.to_path_buf(),
    expected: expected.trim().to_lowercase(),
    actual: actual.0,
  })
}
