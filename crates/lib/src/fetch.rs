//! HTTP download of source archives.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum FetchError {
  #[error("request to {url} failed: {source}")]
  Http {
    url: String,
    #[source]
    source: reqwest::Error,
  },

  #[error("failed to write {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Downloads a URL to a local file.
pub trait Fetcher {
  fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError>;
}

/// Blocking HTTP client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
  client: reqwest::blocking::Client,
}

impl HttpFetcher {
  pub fn new() -> Result<Self, FetchError> {
    let client = reqwest::blocking::Client::builder()
      .user_agent(concat!("libforge/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|source| FetchError::Http {
        url: String::new(),
        source,
      })?;
    Ok(Self { client })
  }
}

impl Fetcher for HttpFetcher {
  fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
    info!(url = %url, dest = ?dest, "downloading");

    let http_err = |source| FetchError::Http {
      url: url.to_string(),
      source,
    };
    let write_err = |source| FetchError::Write {
      path: dest.to_path_buf(),
      source,
    };

    let mut response = self
      .client
      .get(url)
      .send()
      .and_then(|r| r.error_for_status())
      .map_err(http_err)?;

    if let Some(parent) = dest.parent() {
      fs::create_dir_all(parent).map_err(write_err)?;
    }

    let mut writer = BufWriter::new(File::create(dest).map_err(write_err)?);
    let bytes = response.copy_to(&mut writer).map_err(http_err)?;
    writer.flush().map_err(write_err)?;

    debug!(url = %url, bytes, "download complete");
    Ok(())
  }
}
