use std::fmt;

use serde::Serialize;

/// Operating system families a build can target.
///
/// The string form is the token used in platform identifiers
/// (`linux-x86_64`, `osx-x86_64`, `win32-x86`, `android-x86`, `ios`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
  Linux,
  Osx,
  Win32,
  Android,
  Ios,
}

impl Os {
  /// All supported families, in profile-table order.
  pub const ALL: [Os; 5] = [Os::Linux, Os::Osx, Os::Win32, Os::Android, Os::Ios];

  /// Parse an OS token from a platform identifier.
  pub fn from_token(token: &str) -> Option<Self> {
    match token {
      "linux" => Some(Self::Linux),
      "osx" => Some(Self::Osx),
      "win32" => Some(Self::Win32),
      "android" => Some(Self::Android),
      "ios" => Some(Self::Ios),
      _ => None,
    }
  }

  /// Returns the lowercase token for this OS
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::Osx => "osx",
      Self::Win32 => "win32",
      Self::Android => "android",
      Self::Ios => "ios",
    }
  }

  /// Whether this OS uses ELF shared objects (`lib<name>.so`).
  pub fn is_linux_family(&self) -> bool {
    matches!(self, Self::Linux | Self::Android)
  }

  /// Position of this OS in [`Os::ALL`].
  pub(crate) fn index(&self) -> usize {
    match self {
      Self::Linux => 0,
      Self::Osx => 1,
      Self::Win32 => 2,
      Self::Android => 3,
      Self::Ios => 4,
    }
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
