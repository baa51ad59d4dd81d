//! Templates embedded in the binary.
//!
//! Build scripts live under `templates/` and use `{{name}}` placeholders;
//! patches live under `patches/` and use `@name@`.

use super::{Template, TemplateError, TemplateSyntax};

macro_rules! embed {
  ($dir:literal, $file:literal) => {
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/", $dir, "/", $file))
  };
}

/// Build scripts, keyed by file name.
static SCRIPTS: &[(&str, &str)] = &[
  ("openssl-linux-build.sh", embed!("templates", "openssl-linux-build.sh")),
  ("openssl-osx-build.sh", embed!("templates", "openssl-osx-build.sh")),
  ("openssl-win32-build.sh", embed!("templates", "openssl-win32-build.sh")),
  ("openssl-android-build.sh", embed!("templates", "openssl-android-build.sh")),
  ("openssl-ios-build.sh", embed!("templates", "openssl-ios-build.sh")),
  ("sqlcipher-linux-build.sh", embed!("templates", "sqlcipher-linux-build.sh")),
  ("sqlcipher-osx-build.sh", embed!("templates", "sqlcipher-osx-build.sh")),
  ("sqlcipher-win32-build.sh", embed!("templates", "sqlcipher-win32-build.sh")),
  ("sqlcipher-android-build.sh", embed!("templates", "sqlcipher-android-build.sh")),
  ("sqlcipher-ios-build.sh", embed!("templates", "sqlcipher-ios-build.sh")),
  ("setenv-android.sh", embed!("templates", "setenv-android.sh")),
  ("ios-package.sh", embed!("templates", "ios-package.sh")),
];

/// Patches, keyed by name without the `.diff` extension.
static PATCHES: &[(&str, &str)] = &[
  ("sqlite4java-linux", embed!("patches", "sqlite4java-linux.diff")),
  ("sqlite4java-osx", embed!("patches", "sqlite4java-osx.diff")),
  ("sqlite4java-win32", embed!("patches", "sqlite4java-win32.diff")),
  ("sqlite4java-android", embed!("patches", "sqlite4java-android.diff")),
];

fn lookup(table: &[(&str, &'static str)], name: &str) -> Result<&'static str, TemplateError> {
  table
    .iter()
    .find(|(key, _)| *key == name)
    .map(|(_, text)| *text)
    .ok_or_else(|| TemplateError::UnknownTemplate(name.to_string()))
}

/// Load and parse a build script template.
pub fn script(name: &str) -> Result<Template, TemplateError> {
  Template::parse(name, lookup(SCRIPTS, name)?, TemplateSyntax::Braces)
}

/// Load and parse a patch template.
pub fn patch(name: &str) -> Result<Template, TemplateError> {
  Template::parse(name, lookup(PATCHES, name)?, TemplateSyntax::At)
}

/// Names of every embedded script.
pub fn script_names() -> impl Iterator<Item = &'static str> {
  SCRIPTS.iter().map(|(name, _)| *name)
}

/// Names of every embedded patch.
pub fn patch_names() -> impl Iterator<Item = &'static str> {
  PATCHES.iter().map(|(name, _)| *name)
}
