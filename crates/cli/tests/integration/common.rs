//! Shared helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Isolated test environment: a temp directory holding `libforge.toml` and
/// the build root it points at.
pub struct TestEnv {
  pub temp: TempDir,
  pub config_path: PathBuf,
}

impl TestEnv {
  /// Environment with a complete configuration for `platforms`.
  ///
  /// Toolchain homes point into the temp directory and are never created;
  /// tests only run tasks that do not reach for them.
  pub fn with_platforms(platforms: &[&str]) -> Self {
    let env = Self::empty();
    let tools = env.temp.path().join("tools");
    let list = platforms.iter().map(|p| format!("'{p}'")).collect::<Vec<_>>().join(", ");
    let config = format!(
      "root = '{root}'\n\
       platforms = [{list}]\n\
       android-ndk-home = '{tools}/ndk'\n\
       android-sdk-home = '{tools}/sdk'\n\
       groovy-home = '{tools}/groovy'\n\
       gant-home = '{tools}/gant'\n\
       libtool-home = '{tools}/libtool'\n\
       linux-jdk-home = '{tools}/jdk'\n\
       osx-jdk-home = '{tools}/jdk-osx'\n\
       win32-jdk-home = '{tools}/jdk-win32'\n",
      root = env.root().display(),
      tools = tools.display(),
    );
    env.write_config(&config);
    env
  }

  /// Environment without a configuration file.
  pub fn empty() -> Self {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("libforge.toml");
    Self { temp, config_path }
  }

  pub fn write_config(&self, content: &str) {
    std::fs::write(&self.config_path, content).unwrap();
  }

  /// The build root named in the configuration.
  pub fn root(&self) -> PathBuf {
    self.temp.path().join("work")
  }

  /// Create a file under the build root, parents included.
  pub fn touch(&self, relative: impl AsRef<Path>) {
    let path = self.root().join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, b"prebuilt").unwrap();
  }

  /// The `libforge` binary, pointed at this environment's configuration.
  pub fn cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("libforge");
    cmd.env("LIBFORGE_CONFIG", &self.config_path);
    cmd.env_remove("RUST_LOG");
    cmd
  }
}
