//! Pinned upstream source archives.
//!
//! Each entry maps a short key to a download URL and the SHA-256 the archive
//! must hash to. The key names the download task (`download-<key>`) and the
//! saved file (`<src>/<key>.tar.gz`).

use std::path::{Path, PathBuf};

use serde::Serialize;

/// A compiled-in source pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePin {
  pub key: &'static str,
  pub url: &'static str,
  pub sha256: &'static str,
}

pub const OPENSSL: SourcePin = SourcePin {
  key: "openssl",
  url: "https://www.openssl.org/source/openssl-1.0.2h.tar.gz",
  sha256: "1d4007e53aad94a5b2002fe045ee7bb0b3d98f1a47f8b2bc851dcd1c74332919",
};

pub const SQLCIPHER: SourcePin = SourcePin {
  key: "sqlcipher",
  url: "https://github.com/sqlcipher/sqlcipher/archive/v3.4.0.tar.gz",
  sha256: "99b702ecf796de02bf7b7b35de4ceef145f0d62b4467a86707c2d59beea243d0",
};

pub const SQLITE4JAVA: SourcePin = SourcePin {
  key: "sqlite4java",
  url: "https://bitbucket.org/almworks/sqlite4java/get/fa4bb0fe7319a5f1afe008284146ac83e027de60.tar.gz",
  sha256: "24accb1c7abd9549bb28f85b35d519c87406a1dabc832772f85f6c787584f7d2",
};

/// Every pinned source, in download order.
pub const SOURCES: [SourcePin; 3] = [OPENSSL, SQLCIPHER, SQLITE4JAVA];

/// An archive to download and verify.
///
/// Owned so callers can point a download task at something other than the
/// compiled-in pins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Source {
  pub key: String,
  pub url: String,
  pub sha256: String,
}

impl Source {
  pub fn new(key: impl Into<String>, url: impl Into<String>, sha256: impl Into<String>) -> Self {
    Self {
      key: key.into(),
      url: url.into(),
      sha256: sha256.into(),
    }
  }

  pub fn file_name(&self) -> String {
    archive_file_name(&self.key)
  }

  pub fn task_name(&self) -> String {
    download_task_name(&self.key)
  }
}

impl From<SourcePin> for Source {
  fn from(pin: SourcePin) -> Self {
    Self::new(pin.key, pin.url, pin.sha256)
  }
}

pub fn archive_file_name(key: &str) -> String {
  format!("{key}.tar.gz")
}

pub fn download_task_name(key: &str) -> String {
  format!("download-{key}")
}

/// Where the archive for `key` is saved.
pub fn archive_path(src_dir: &Path, key: &str) -> PathBuf {
  src_dir.join(archive_file_name(key))
}
