//! The build context threaded through every task.
//!
//! A [`BuildContext`] is immutable once constructed. Tasks read paths, tool
//! locations and the platform list from it; the only state tasks share is the
//! filesystem under [`Layout::root`].

use std::path::{Path, PathBuf};

use crate::config::{ConfigError, RawConfig};
use crate::error::StepError;
use crate::platform::os::Os;
use crate::platform::{Platform, PlatformKind, parse_platforms};

/// Directory layout derived from the root path.
///
/// ```text
/// <root>/src                  downloaded source archives
/// <root>/build/<platform>     per-platform working directories
/// <root>/root/<platform>      per-platform install prefixes
/// <root>/output               desktop dynamic libraries
/// <root>/output/android/<abi> Android shared objects
/// <root>/output/ios           iOS static archive
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
  root: PathBuf,
  src: PathBuf,
  build: PathBuf,
  prefix: PathBuf,
  output: PathBuf,
  android_output: PathBuf,
  ios_output: PathBuf,
}

impl Layout {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    let root = root.into();
    let output = root.join("output");
    Self {
      src: root.join("src"),
      build: root.join("build"),
      prefix: root.join("root"),
      android_output: output.join("android"),
      ios_output: output.join("ios"),
      output,
      root,
    }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn src_dir(&self) -> &Path {
    &self.src
  }

  pub fn build_dir(&self) -> &Path {
    &self.build
  }

  pub fn prefix_dir(&self) -> &Path {
    &self.prefix
  }

  pub fn output_dir(&self) -> &Path {
    &self.output
  }

  pub fn android_output_dir(&self) -> &Path {
    &self.android_output
  }

  pub fn ios_output_dir(&self) -> &Path {
    &self.ios_output
  }

  /// Top-level directories created before any platform work.
  pub fn work_dirs(&self) -> [&Path; 6] {
    [
      self.src.as_path(),
      self.build.as_path(),
      self.prefix.as_path(),
      self.output.as_path(),
      self.android_output.as_path(),
      self.ios_output.as_path(),
    ]
  }

  /// `<root>/build/<platform>`
  pub fn platform_build_dir(&self, platform: &Platform) -> PathBuf {
    self.build.join(platform.id())
  }

  /// `<root>/root/<platform>`
  pub fn platform_prefix(&self, platform: &Platform) -> PathBuf {
    self.prefix.join(platform.id())
  }

  /// Directory in the output tree that receives this platform's libraries.
  pub fn platform_output_dir(&self, platform: &Platform) -> PathBuf {
    match platform.kind() {
      PlatformKind::Desktop => self.output.clone(),
      PlatformKind::Android(abi) => self.android_output.join(abi.as_str()),
      PlatformKind::Ios => self.ios_output.clone(),
    }
  }
}

/// Tool locations, one home directory per external toolchain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchains {
  pub android_ndk_home: PathBuf,
  pub android_sdk_home: PathBuf,
  pub groovy_home: PathBuf,
  pub gant_home: PathBuf,
  pub libtool_home: PathBuf,
  pub linux_jdk_home: PathBuf,
  pub osx_jdk_home: PathBuf,
  pub win32_jdk_home: PathBuf,
}

impl Toolchains {
  /// JDK used when linking JNI libraries for a desktop OS.
  pub fn jdk_home(&self, os: Os) -> Option<&Path> {
    match os {
      Os::Linux => Some(&self.linux_jdk_home),
      Os::Osx => Some(&self.osx_jdk_home),
      Os::Win32 => Some(&self.win32_jdk_home),
      Os::Android | Os::Ios => None,
    }
  }

  /// Directory holding up-to-date `config.sub` and `config.guess`.
  pub fn libtool_build_aux(&self) -> PathBuf {
    self.libtool_home.join("share").join("libtool").join("build-aux")
  }

  pub fn gant_bin(&self) -> PathBuf {
    self.gant_home.join("bin").join("gant")
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
  layout: Layout,
  toolchains: Toolchains,
  platforms: Vec<Platform>,
}

impl BuildContext {
  pub fn new(root: impl Into<PathBuf>, toolchains: Toolchains, platforms: Vec<Platform>) -> Self {
    Self {
      layout: Layout::new(root),
      toolchains,
      platforms,
    }
  }

  /// Validate a raw configuration into a context.
  ///
  /// Every required key must be present, and every platform must parse and
  /// pass [`crate::steps::check_platforms`]. Nothing is touched on disk.
  pub fn from_config(raw: &RawConfig) -> Result<Self, ConfigError> {
    fn required<'a>(value: &'a Option<String>, key: &'static str) -> Result<&'a str, ConfigError> {
      match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::MissingKey(key)),
      }
    }

    let root = required(&raw.root, "root")?;
    let platform_list = raw.platforms.as_ref().ok_or(ConfigError::MissingKey("platforms"))?;
    let toolchains = Toolchains {
      android_ndk_home: required(&raw.android_ndk_home, "android-ndk-home")?.into(),
      android_sdk_home: required(&raw.android_sdk_home, "android-sdk-home")?.into(),
      groovy_home: required(&raw.groovy_home, "groovy-home")?.into(),
      gant_home: required(&raw.gant_home, "gant-home")?.into(),
      libtool_home: required(&raw.libtool_home, "libtool-home")?.into(),
      linux_jdk_home: required(&raw.linux_jdk_home, "linux-jdk-home")?.into(),
      osx_jdk_home: required(&raw.osx_jdk_home, "osx-jdk-home")?.into(),
      win32_jdk_home: required(&raw.win32_jdk_home, "win32-jdk-home")?.into(),
    };

    let tokens = platform_list.tokens();
    if tokens.is_empty() {
      return Err(ConfigError::Invalid {
        key: "platforms",
        message: "at least one platform is required".to_string(),
      });
    }
    let platforms = parse_platforms(&tokens)?;

    let ctx = Self::new(root, toolchains, platforms);
    crate::steps::check_platforms(&ctx).map_err(|e| match e {
      StepError::Platform(e) => ConfigError::Platform(e),
      other => ConfigError::Invalid {
        key: "platforms",
        message: other.to_string(),
      },
    })?;
    Ok(ctx)
  }

  pub fn layout(&self) -> &Layout {
    &self.layout
  }

  pub fn toolchains(&self) -> &Toolchains {
    &self.toolchains
  }

  pub fn platforms(&self) -> &[Platform] {
    &self.platforms
  }
}
