//! Fake process runner and fetcher for exercising steps without toolchains.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use sha2::{Digest, Sha256};

use super::{StepEnv, sqlite4java_variant};
use crate::archive::testutil::write_tar_gz;
use crate::artifact::dynamic_lib_name;
use crate::command::{CommandError, CommandRunner, CommandSpec};
use crate::context::testutil::test_context;
use crate::fetch::{FetchError, Fetcher};
use crate::platform::Platform;
use crate::sources::{SOURCES, archive_path};

pub fn sha256_hex(data: &[u8]) -> String {
  hex::encode(Sha256::digest(data))
}

#[derive(Default)]
struct Shared {
  commands: Vec<CommandSpec>,
  downloads: Vec<String>,
  served: HashMap<String, Vec<u8>>,
  fail_program: Option<String>,
  produce_output: bool,
}

/// Handle for inspecting and steering the fakes after the env is built.
#[derive(Clone, Default)]
pub struct Calls(Rc<RefCell<Shared>>);

impl Calls {
  pub fn commands(&self) -> Vec<CommandSpec> {
    self.0.borrow().commands.clone()
  }

  pub fn programs(&self) -> Vec<String> {
    self
      .0
      .borrow()
      .commands
      .iter()
      .map(|c| c.program_name().to_string())
      .collect()
  }

  pub fn downloads(&self) -> Vec<String> {
    self.0.borrow().downloads.clone()
  }

  pub fn serve(&self, url: &str, body: &[u8]) {
    self.0.borrow_mut().served.insert(url.to_string(), body.to_vec());
  }

  /// Make every invocation of `program` exit with status 1.
  pub fn fail(&self, program: &str) {
    self.0.borrow_mut().fail_program = Some(program.to_string());
  }

  /// Let commands succeed without writing their expected output.
  pub fn produce_nothing(&self) {
    self.0.borrow_mut().produce_output = false;
  }
}

struct FakeRunner(Calls);

fn script_var(script: &Path, name: &str) -> Option<PathBuf> {
  let text = fs::read_to_string(script).ok()?;
  let prefix = format!("{name}=\"");
  text
    .lines()
    .find_map(|line| line.strip_prefix(&prefix)?.strip_suffix('"').map(PathBuf::from))
}

fn touch(path: &Path) {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  fs::write(path, b"fake").unwrap();
}

/// Imitate what the real tools leave behind.
fn simulate(spec: &CommandSpec) {
  let script = spec.args.first().map(|a| spec.cwd.join(a));
  match (spec.program_name(), script) {
    ("bash", Some(script)) if script.ends_with("build.sh") => {
      let prefix = script_var(&script, "PREFIX").unwrap();
      let library = match spec.cwd.file_name().and_then(|n| n.to_str()) {
        Some("openssl") => "crypto",
        Some(other) => other,
        None => panic!("build.sh run outside a source dir"),
      };
      touch(&prefix.join("lib").join(format!("lib{library}.a")));
      touch(&prefix.join("include").join(format!("{library}.h")));
    }
    ("bash", Some(script)) if script.ends_with("package.sh") => {
      touch(&script_var(&script, "OUTPUT").unwrap());
    }
    ("gant", _) => {
      // cwd is <root>/build/<platform>/sqlite4java/ant
      let source = spec.cwd.parent().unwrap();
      let platform: Platform = source
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap()
        .parse()
        .unwrap();
      let output = match platform.abi() {
        Some(abi) => source
          .join("build/android/project/libs")
          .join(abi.as_str())
          .join("libsqlite4java-android.so"),
        None => {
          let variant = sqlite4java_variant(&platform).unwrap();
          let file = dynamic_lib_name(&platform, &format!("sqlite4java-{variant}")).unwrap();
          source.join(format!("build/lib.release.{variant}")).join(file)
        }
      };
      touch(&output);
    }
    _ => {}
  }
}

impl CommandRunner for FakeRunner {
  fn run(&self, spec: &CommandSpec) -> Result<(), CommandError> {
    let (fail, produce) = {
      let mut shared = self.0.0.borrow_mut();
      shared.commands.push(spec.clone());
      (
        shared.fail_program.as_deref() == Some(spec.program_name()),
        shared.produce_output,
      )
    };
    if fail {
      return Err(CommandError::Failed {
        command: spec.to_string(),
        code: Some(1),
      });
    }
    if produce {
      simulate(spec);
    }
    Ok(())
  }
}

struct FakeFetcher(Calls);

impl Fetcher for FakeFetcher {
  fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
    let mut shared = self.0.0.borrow_mut();
    shared.downloads.push(url.to_string());
    let body = shared.served.get(url).ok_or_else(|| FetchError::Write {
      path: dest.to_path_buf(),
      source: io::Error::other(format!("nothing served at {url}")),
    })?;
    fs::write(dest, body).map_err(|source| FetchError::Write {
      path: dest.to_path_buf(),
      source,
    })
  }
}

/// A step environment rooted at `root` with fake runner and fetcher.
pub fn env(root: &Path, platforms: &[&str]) -> (StepEnv, Calls) {
  let calls = Calls::default();
  calls.0.borrow_mut().produce_output = true;
  let env = StepEnv::new(
    test_context(root, platforms),
    FakeRunner(calls.clone()),
    FakeFetcher(calls.clone()),
  );
  (env, calls)
}

/// Put unpackable archives for every pinned source in `<root>/src`, plus the
/// libtool helper scripts sqlcipher needs.
pub fn seed_sources(env: &StepEnv) {
  let layout = env.ctx().layout();
  fs::create_dir_all(layout.src_dir()).unwrap();
  for pin in SOURCES {
    let wrapper = format!("{}-1.0/README", pin.key);
    write_tar_gz(&archive_path(layout.src_dir(), pin.key), &[(wrapper.as_str(), "sources")]);
  }

  let aux = env.ctx().toolchains().libtool_build_aux();
  fs::create_dir_all(&aux).unwrap();
  fs::write(aux.join("config.sub"), "#!/bin/sh\n").unwrap();
  fs::write(aux.join("config.guess"), "#!/bin/sh\n").unwrap();
}
