//! Per-family build profiles.
//!
//! Each OS family maps to a [`Profile`]: the template family used to pick
//! `<step>-<family>-build.sh`, and an environment builder producing the
//! platform-specific template bindings. Adding a platform family is a new row
//! in [`PROFILES`], not a new type.

use std::collections::BTreeMap;

use super::android::{ANDROID_API, NDK_HOST_TAG};
use super::os::Os;
use super::{Platform, PlatformError};
use crate::context::BuildContext;

/// Template bindings contributed by a platform profile.
pub type PlatformEnv = BTreeMap<String, String>;

/// Builds the platform bindings for one target.
pub type EnvBuilder = fn(&BuildContext, &Platform) -> Result<PlatformEnv, PlatformError>;

/// Minimum iOS deployment target.
pub const IOS_MIN_VERSION: &str = "8.0";

#[derive(Debug)]
pub struct Profile {
  pub os: Os,
  /// Template family name, e.g. `linux` in `openssl-linux-build.sh`.
  pub family: &'static str,
  env: EnvBuilder,
}

impl Profile {
  /// Name of the build script template for a step in this family.
  pub fn build_template(&self, step: &str) -> String {
    format!("{step}-{}-build.sh", self.family)
  }

  /// Name of the patch template for a step in this family.
  pub fn patch(&self, step: &str) -> String {
    format!("{step}-{}", self.family)
  }

  pub fn environment(&self, ctx: &BuildContext, platform: &Platform) -> Result<PlatformEnv, PlatformError> {
    (self.env)(ctx, platform)
  }
}

/// Indexed by [`Os::index`].
static PROFILES: [Profile; 5] = [
  Profile {
    os: Os::Linux,
    family: "linux",
    env: linux_env,
  },
  Profile {
    os: Os::Osx,
    family: "osx",
    env: osx_env,
  },
  Profile {
    os: Os::Win32,
    family: "win32",
    env: win32_env,
  },
  Profile {
    os: Os::Android,
    family: "android",
    env: android_env,
  },
  Profile {
    os: Os::Ios,
    family: "ios",
    env: ios_env,
  },
];

/// Look up the profile for an OS family.
pub fn profile(os: Os) -> &'static Profile {
  &PROFILES[os.index()]
}

fn base_env(platform: &Platform, openssl_target: &str) -> PlatformEnv {
  let mut env = PlatformEnv::new();
  env.insert("platform".to_string(), platform.id());
  env.insert("openssl-target".to_string(), openssl_target.to_string());
  env
}

fn arch_of(platform: &Platform) -> Result<&str, PlatformError> {
  platform
    .arch()
    .ok_or_else(|| PlatformError::unsupported(platform, "missing architecture"))
}

fn linux_env(_ctx: &BuildContext, platform: &Platform) -> Result<PlatformEnv, PlatformError> {
  let target = match arch_of(platform)? {
    "x86_64" | "amd64" => "linux-x86_64",
    "x86" | "i386" | "i686" => "linux-elf",
    "aarch64" | "arm64" => "linux-aarch64",
    other => return Err(PlatformError::unsupported(platform, format!("no linux target for '{other}'"))),
  };
  Ok(base_env(platform, target))
}

fn osx_env(_ctx: &BuildContext, platform: &Platform) -> Result<PlatformEnv, PlatformError> {
  let target = match arch_of(platform)? {
    "x86_64" => "darwin64-x86_64-cc",
    "x86" | "i386" => "darwin-i386-cc",
    other => return Err(PlatformError::unsupported(platform, format!("no osx target for '{other}'"))),
  };
  Ok(base_env(platform, target))
}

fn win32_env(_ctx: &BuildContext, platform: &Platform) -> Result<PlatformEnv, PlatformError> {
  let (target, host) = match arch_of(platform)? {
    "x86_64" | "x64" => ("mingw64", "x86_64-w64-mingw32"),
    "x86" | "i686" => ("mingw", "i686-w64-mingw32"),
    other => return Err(PlatformError::unsupported(platform, format!("no mingw target for '{other}'"))),
  };
  let mut env = base_env(platform, target);
  env.insert("host".to_string(), host.to_string());
  env.insert("cross-prefix".to_string(), format!("{host}-"));
  Ok(env)
}

fn android_env(ctx: &BuildContext, platform: &Platform) -> Result<PlatformEnv, PlatformError> {
  let abi = platform
    .abi()
    .ok_or_else(|| PlatformError::unsupported(platform, "not an Android ABI"))?;
  let toolchains = ctx.toolchains();

  let mut env = base_env(platform, abi.openssl_target());
  env.insert("abi".to_string(), abi.as_str().to_string());
  env.insert("host".to_string(), abi.configure_host().to_string());
  env.insert("arch".to_string(), abi.ndk_arch().to_string());
  env.insert("eabi".to_string(), abi.toolchain_eabi().to_string());
  env.insert("api".to_string(), ANDROID_API.to_string());
  env.insert("host-tag".to_string(), NDK_HOST_TAG.to_string());
  env.insert(
    "ndk-home".to_string(),
    toolchains.android_ndk_home.to_string_lossy().into_owned(),
  );
  env.insert(
    "sdk-home".to_string(),
    toolchains.android_sdk_home.to_string_lossy().into_owned(),
  );
  Ok(env)
}

fn ios_env(_ctx: &BuildContext, platform: &Platform) -> Result<PlatformEnv, PlatformError> {
  let mut env = base_env(platform, "iphoneos-cross");
  env.insert("host".to_string(), "arm-apple-darwin".to_string());
  env.insert("sdk".to_string(), "iphoneos".to_string());
  env.insert("min-ios".to_string(), IOS_MIN_VERSION.to_string());
  Ok(env)
}
