//! `libforge run`: execute a task and its dependencies.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

use libforge_lib::Error;
use libforge_lib::command::SystemRunner;
use libforge_lib::fetch::HttpFetcher;
use libforge_lib::steps::{self, StepEnv};
use libforge_lib::task::Executor;

use crate::output::{OutputFormat, format_elapsed, print_info, print_json, print_stat, print_success, symbols};

pub fn cmd_run(task: &str, config: &Path, format: OutputFormat) -> Result<()> {
  let ctx = super::load_context(config)?;
  let platforms: Vec<String> = ctx.platforms().iter().map(|p| p.id()).collect();
  let root = ctx.layout().root().to_path_buf();

  let registry = steps::default_registry()
    .map_err(Error::from)
    .context("task registry is invalid")?;
  let env = StepEnv::new(ctx, SystemRunner, HttpFetcher::new()?);

  if !format.is_json() {
    print_info(&format!("Running '{}' for {}", task, platforms.join(", ")));
  }

  let start = Instant::now();
  let report = Executor::new(&registry).run(task, &env).map_err(Error::from)?;
  let elapsed = start.elapsed();

  if format.is_json() {
    print_json(&serde_json::json!({
      "task": task,
      "root": root,
      "platforms": platforms,
      "executed": report.executed,
      "elapsed_ms": elapsed.as_millis() as u64,
    }))?;
  } else {
    print_success(&format!("'{}' finished in {}", task, format_elapsed(elapsed)));
    print_stat("Root", &root.display().to_string());
    print_stat("Tasks run", &report.executed.len().to_string());
    for name in &report.executed {
      println!("    {} {}", symbols::ARROW, name);
    }
  }

  Ok(())
}
