use std::fs;
use std::path::Path;

use tracing::info;

use super::{CREATE_WORK_DIRS, StepEnv};
use crate::checksum::verify_file;
use crate::error::StepError;
use crate::sources::Source;
use crate::task::{Task, TaskInfo};

/// Downloads one source archive into `<src>/<key>.tar.gz` and verifies it.
///
/// The archive is fetched to a `.part` file and only renamed into place
/// after its digest matches, so an existing archive is always a verified one
/// and is never downloaded again.
pub struct DownloadTask {
  info: TaskInfo,
  source: Source,
}

impl DownloadTask {
  pub fn new(source: Source) -> Self {
    let info = TaskInfo::new(source.task_name(), format!("Download {}", source.key)).depends_on(CREATE_WORK_DIRS);
    Self { info, source }
  }
}

fn remove_if_present(path: &Path) -> Result<(), StepError> {
  match fs::remove_file(path) {
    Ok(()) => Ok(()),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
    Err(e) => Err(StepError::io(format!("removing {}", path.display()), e)),
  }
}

impl Task<StepEnv> for DownloadTask {
  fn info(&self) -> &TaskInfo {
    &self.info
  }

  fn run(&self, env: &StepEnv) -> Result<(), StepError> {
    let src_dir = env.ctx().layout().src_dir();
    let dest = src_dir.join(self.source.file_name());
    if dest.is_file() {
      info!(path = ?dest, "source archive already present, not downloading");
      return Ok(());
    }

    let partial = src_dir.join(format!("{}.part", self.source.file_name()));
    remove_if_present(&partial)?;

    if let Err(e) = env.fetcher().fetch(&self.source.url, &partial) {
      remove_if_present(&partial)?;
      return Err(e.into());
    }

    let digest = verify_file(&partial, &self.source.sha256)?;
    fs::rename(&partial, &dest).map_err(|e| StepError::io(format!("moving {} into place", partial.display()), e))?;

    info!(path = ?dest, sha256 = %digest, "downloaded and verified");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::checksum::ChecksumError;
  use crate::steps::testutil::{env, sha256_hex};

  const URL: &str = "https://example.invalid/openssl.tar.gz";

  fn task(body: &[u8]) -> DownloadTask {
    DownloadTask::new(Source::new("openssl", URL, sha256_hex(body)))
  }

  #[test]
  fn downloads_and_verifies() {
    let temp = tempfile::tempdir().unwrap();
    let (env, calls) = env(temp.path(), &["linux-x86_64"]);
    calls.serve(URL, b"tarball");
    std::fs::create_dir_all(temp.path().join("src")).unwrap();

    task(b"tarball").run(&env).unwrap();

    let dest = temp.path().join("src/openssl.tar.gz");
    assert_eq!(std::fs::read(&dest).unwrap(), b"tarball");
    assert!(!temp.path().join("src/openssl.tar.gz.part").exists());
    assert_eq!(calls.downloads(), [URL]);
  }

  #[test]
  fn existing_archive_is_not_downloaded() {
    let temp = tempfile::tempdir().unwrap();
    let (env, calls) = env(temp.path(), &["linux-x86_64"]);
    std::fs::create_dir_all(temp.path().join("src")).unwrap();
    std::fs::write(temp.path().join("src/openssl.tar.gz"), b"tarball").unwrap();

    task(b"tarball").run(&env).unwrap();
    assert!(calls.downloads().is_empty());
  }

  #[test]
  fn checksum_mismatch_leaves_nothing_behind() {
    let temp = tempfile::tempdir().unwrap();
    let (env, calls) = env(temp.path(), &["linux-x86_64"]);
    calls.serve(URL, b"tampered");
    std::fs::create_dir_all(temp.path().join("src")).unwrap();

    let err = task(b"tarball").run(&env).unwrap_err();

    assert!(matches!(err, StepError::Checksum(ChecksumError::Mismatch { .. })));
    assert!(!temp.path().join("src/openssl.tar.gz").exists());
    assert!(!temp.path().join("src/openssl.tar.gz.part").exists());
  }

  #[test]
  fn fetch_failure_is_reported() {
    let temp = tempfile::tempdir().unwrap();
    let (env, _calls) = env(temp.path(), &["linux-x86_64"]);
    std::fs::create_dir_all(temp.path().join("src")).unwrap();

    let err = task(b"tarball").run(&env).unwrap_err();
    assert!(matches!(err, StepError::Fetch(_)));
  }
}
