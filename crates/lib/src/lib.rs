//! libforge-lib: build orchestration for native libraries across platforms
//!
//! This crate drives builds of openssl, sqlcipher and sqlite4java for desktop,
//! Android and iOS targets:
//! - `task`: named tasks with declared dependencies and a depth-first executor
//! - `artifact`: deterministic library paths; existence means "already built"
//! - `template`: `{{name}}` / `@name@` substitution for scripts and patches
//! - `checksum`: SHA-256 verification of downloaded archives
//! - `steps`: the concrete download and build pipeline
//!
//! A run is single-threaded and synchronous. Progress is recorded only as
//! files on disk, so two invocations against the same root directory at once
//! are not supported; callers are responsible for not doing that.
//!
//! # Example
//!
//! ```no_run
//! use libforge_lib::command::SystemRunner;
//! use libforge_lib::config::RawConfig;
//! use libforge_lib::context::BuildContext;
//! use libforge_lib::fetch::HttpFetcher;
//! use libforge_lib::steps::{self, StepEnv};
//! use libforge_lib::task::Executor;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let raw = RawConfig::load("libforge.toml".as_ref())?.interpolate(|name| std::env::var(name).ok())?;
//! let env = StepEnv::new(BuildContext::from_config(&raw)?, SystemRunner, HttpFetcher::new()?);
//! let registry = steps::default_registry()?;
//! let report = Executor::new(&registry).run(steps::ALL, &env)?;
//! println!("ran {} tasks", report.executed.len());
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod artifact;
pub mod checksum;
pub mod command;
pub mod config;
pub mod context;
pub mod error;
pub mod fetch;
pub mod platform;
pub mod sources;
pub mod stage;
pub mod steps;
pub mod task;
pub mod template;

pub use error::{Error, ErrorKind, StepError};
