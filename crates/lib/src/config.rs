//! Configuration file loading.
//!
//! The configuration file is TOML with kebab-case keys:
//!
//! ```toml
//! root = "$HOME/libbuild"
//! platforms = ["linux-x86_64", "android-x86", "android-armeabi-v7a"]
//! android-ndk-home = "$ANDROID_NDK_HOME"
//! android-sdk-home = "$ANDROID_HOME"
//! groovy-home = "/opt/groovy"
//! gant-home = "/opt/gant"
//! libtool-home = "/usr"
//! linux-jdk-home = "/usr/lib/jvm/java-8-openjdk"
//! osx-jdk-home = "/opt/jdk-osx"
//! win32-jdk-home = "/opt/jdk-win32"
//! ```
//!
//! `platforms` may also be a single comma-separated string.
//!
//! `$NAME` inside string values is replaced by the value returned from a lookup
//! function (normally the process environment). `$$` produces a literal `$`.
//! The loader never reads the environment itself; callers pass the lookup in.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::platform::PlatformError;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config: {0}")]
  Parse(String),

  #[error("missing required key: {0}")]
  MissingKey(&'static str),

  #[error("unset environment variable ${variable} referenced by '{key}'")]
  UnsetVariable { key: String, variable: String },

  #[error("invalid value for '{key}': {message}")]
  Invalid { key: &'static str, message: String },

  #[error(transparent)]
  Platform(#[from] PlatformError),
}

/// The platform list, as an array or a comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PlatformList {
  List(Vec<String>),
  Csv(String),
}

impl PlatformList {
  pub fn tokens(&self) -> Vec<String> {
    match self {
      PlatformList::List(items) => items.iter().map(|s| s.trim().to_string()).collect(),
      PlatformList::Csv(s) => s
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect(),
    }
  }
}

/// Configuration exactly as written in the file. Every key is optional here;
/// required keys are enforced by [`crate::context::BuildContext::from_config`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawConfig {
  pub root: Option<String>,
  pub platforms: Option<PlatformList>,
  pub android_ndk_home: Option<String>,
  pub android_sdk_home: Option<String>,
  pub groovy_home: Option<String>,
  pub gant_home: Option<String>,
  pub libtool_home: Option<String>,
  pub linux_jdk_home: Option<String>,
  pub osx_jdk_home: Option<String>,
  pub win32_jdk_home: Option<String>,
}

impl RawConfig {
  pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
  }

  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_toml_str(&content)
  }

  /// Replace `$NAME` references in every string value.
  pub fn interpolate<F>(self, lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let field = |key: &str, value: Option<String>| -> Result<Option<String>, ConfigError> {
      value.map(|v| interpolate(key, &v, &lookup)).transpose()
    };

    let platforms = match self.platforms {
      Some(PlatformList::List(items)) => Some(PlatformList::List(
        items
          .iter()
          .map(|item| interpolate("platforms", item, &lookup))
          .collect::<Result<_, _>>()?,
      )),
      Some(PlatformList::Csv(s)) => Some(PlatformList::Csv(interpolate("platforms", &s, &lookup)?)),
      None => None,
    };

    Ok(Self {
      root: field("root", self.root)?,
      platforms,
      android_ndk_home: field("android-ndk-home", self.android_ndk_home)?,
      android_sdk_home: field("android-sdk-home", self.android_sdk_home)?,
      groovy_home: field("groovy-home", self.groovy_home)?,
      gant_home: field("gant-home", self.gant_home)?,
      libtool_home: field("libtool-home", self.libtool_home)?,
      linux_jdk_home: field("linux-jdk-home", self.linux_jdk_home)?,
      osx_jdk_home: field("osx-jdk-home", self.osx_jdk_home)?,
      win32_jdk_home: field("win32-jdk-home", self.win32_jdk_home)?,
    })
  }
}

/// Expand `$NAME` references in a single value.
///
/// Variable names are `[A-Za-z0-9_]+`. A `$` not followed by a name is kept.
pub fn interpolate<F>(key: &str, value: &str, lookup: &F) -> Result<String, ConfigError>
where
  F: Fn(&str) -> Option<String>,
{
  let mut result = String::with_capacity(value.len());
  let mut chars = value.chars().peekable();

  while let Some(ch) = chars.next() {
    if ch != '$' {
      result.push(ch);
      continue;
    }

    if chars.peek() == Some(&'$') {
      chars.next();
      result.push('$');
      continue;
    }

    let mut name = String::new();
    while let Some(&c) = chars.peek() {
      if c.is_ascii_alphanumeric() || c == '_' {
        name.push(c);
        chars.next();
      } else {
        break;
      }
    }

    if name.is_empty() {
      result.push('$');
      continue;
    }

    let resolved = lookup(&name).ok_or_else(|| ConfigError::UnsetVariable {
      key: key.to_string(),
      variable: name.clone(),
    })?;
    result.push_str(&resolved);
  }

  Ok(result)
}
