//! Android ABI tables.
//!
//! The NDK setenv script only knows the `x86` and `arm` toolchains, so only the
//! matching ABIs are accepted. `x86_64` and `arm64-v8a` need a newer setenv script.

use std::fmt;

/// Minimum Android API level the libraries are built against.
pub const ANDROID_API: &str = "19";

/// Host tag of the machine running the NDK toolchains.
pub const NDK_HOST_TAG: &str = "linux-x86_64";

/// Supported Android ABIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Abi {
  X86,
  ArmeabiV7a,
}

impl Abi {
  pub fn parse(token: &str) -> Option<Self> {
    match token {
      "x86" => Some(Self::X86),
      "armeabi-v7a" => Some(Self::ArmeabiV7a),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::X86 => "x86",
      Self::ArmeabiV7a => "armeabi-v7a",
    }
  }

  /// Triple passed to `./configure --host=...`.
  pub fn configure_host(&self) -> &'static str {
    match self {
      Self::X86 => "i686-linux-android",
      Self::ArmeabiV7a => "arm-linux-androideabi",
    }
  }

  /// Architecture directory under `$NDK/platforms/android-N/arch-*`.
  pub fn ndk_arch(&self) -> &'static str {
    match self {
      Self::X86 => "x86",
      Self::ArmeabiV7a => "arm",
    }
  }

  /// Toolchain directory name under `$NDK/toolchains/`.
  pub fn toolchain_eabi(&self) -> &'static str {
    match self {
      Self::X86 => "x86-4.9",
      Self::ArmeabiV7a => "arm-linux-androideabi-4.9",
    }
  }

  /// OpenSSL `Configure` target for this ABI.
  pub fn openssl_target(&self) -> &'static str {
    match self {
      Self::X86 => "android-x86",
      Self::ArmeabiV7a => "android-armv7",
    }
  }
}

impl fmt::Display for Abi {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
