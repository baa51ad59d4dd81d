//! Build target platforms.
//!
//! A platform identifier is one of:
//! - `<os>-<arch>` for desktop targets (`linux-x86_64`, `osx-x86_64`, `win32-x86`)
//! - `android-<abi>` (`android-armeabi-v7a`)
//! - the literal `ios`
//!
//! Identifiers are split on the first hyphen only, since ABI names contain hyphens.

pub mod android;
pub mod os;
pub mod profile;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

use android::Abi;
use os::Os;

/// Errors produced while parsing platform identifiers or applying the naming policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
  #[error("malformed platform identifier '{0}': expected <os>-<arch>, android-<abi> or ios")]
  Malformed(String),

  #[error("unsupported platform '{platform}': {reason}")]
  Unsupported { platform: String, reason: String },

  #[error("platforms '{first}' and '{second}' would both build {}", .path.display())]
  Collision {
    first: String,
    second: String,
    path: PathBuf,
  },
}

impl PlatformError {
  pub(crate) fn unsupported(platform: impl fmt::Display, reason: impl Into<String>) -> Self {
    Self::Unsupported {
      platform: platform.to_string(),
      reason: reason.into(),
    }
  }
}

/// Coarse platform kind, used wherever desktop, Android and iOS take different paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformKind {
  Desktop,
  Android(Abi),
  Ios,
}

/// A build target: OS family plus architecture or ABI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Platform {
  os: Os,
  arch: Option<String>,
}

impl Platform {
  /// The single supported iOS target.
  pub fn ios() -> Self {
    Self { os: Os::Ios, arch: None }
  }

  pub fn os(&self) -> Os {
    self.os
  }

  /// Architecture (desktop) or ABI (Android). `None` for iOS.
  pub fn arch(&self) -> Option<&str> {
    self.arch.as_deref()
  }

  pub fn kind(&self) -> PlatformKind {
    match self.os {
      Os::Android => match self.arch.as_deref().and_then(Abi::parse) {
        Some(abi) => PlatformKind::Android(abi),
        // parse() only admits known ABIs
        None => PlatformKind::Desktop,
      },
      Os::Ios => PlatformKind::Ios,
      Os::Linux | Os::Osx | Os::Win32 => PlatformKind::Desktop,
    }
  }

  pub fn is_android(&self) -> bool {
    self.os == Os::Android
  }

  /// The Android ABI, if this is an Android platform.
  pub fn abi(&self) -> Option<Abi> {
    match self.kind() {
      PlatformKind::Android(abi) => Some(abi),
      _ => None,
    }
  }

  /// The identifier this platform was parsed from.
  pub fn id(&self) -> String {
    match &self.arch {
      Some(arch) => format!("{}-{}", self.os, arch),
      None => self.os.to_string(),
    }
  }
}

impl FromStr for Platform {
  type Err = PlatformError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let token = s.trim();
    if token == Os::Ios.as_str() {
      return Ok(Self::ios());
    }

    let (os_token, arch) = token
      .split_once('-')
      .ok_or_else(|| PlatformError::Malformed(token.to_string()))?;
    if os_token.is_empty() || arch.is_empty() {
      return Err(PlatformError::Malformed(token.to_string()));
    }

    let os = Os::from_token(os_token)
      .ok_or_else(|| PlatformError::unsupported(token, format!("unknown operating system '{os_token}'")))?;

    match os {
      Os::Ios => Err(PlatformError::unsupported(
        token,
        "only a single 'ios' target is supported",
      )),
      Os::Android if Abi::parse(arch).is_none() => Err(PlatformError::unsupported(
        token,
        format!("unknown Android ABI '{arch}'"),
      )),
      _ => Ok(Self {
        os,
        arch: Some(arch.to_string()),
      }),
    }
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.arch {
      Some(arch) => write!(f, "{}-{}", self.os, arch),
      None => write!(f, "{}", self.os),
    }
  }
}

impl Serialize for Platform {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.id())
  }
}

/// Parse a list of platform identifiers, rejecting duplicates.
pub fn parse_platforms<I, S>(tokens: I) -> Result<Vec<Platform>, PlatformError>
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  let mut platforms: Vec<Platform> = Vec::new();
  for token in tokens {
    let platform: Platform = token.as_ref().parse()?;
    if platforms.contains(&platform) {
      return Err(PlatformError::unsupported(&platform, "listed more than once"));
    }
    platforms.push(platform);
  }
  Ok(platforms)
}
