use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};

use libforge_lib::Error;
use libforge_lib::steps;
use libforge_lib::task::TaskInfo;

use crate::output::{OutputFormat, print_json, symbols};

pub fn cmd_list(format: OutputFormat) -> Result<()> {
  let registry = steps::default_registry()
    .map_err(Error::from)
    .context("task registry is invalid")?;
  let tasks: Vec<&TaskInfo> = registry.tasks().collect();

  if format.is_json() {
    return print_json(&tasks);
  }

  let width = tasks.iter().map(|t| t.name.len()).max().unwrap_or(0);
  for task in tasks {
    println!(
      "{:<width$}  {}",
      task.name.if_supports_color(Stream::Stdout, |s| s.bold()),
      task.description,
    );
    if !task.dependencies.is_empty() {
      println!(
        "{:<width$}  {} {}",
        "",
        symbols::ARROW,
        task.dependencies.join(", ").if_supports_color(Stream::Stdout, |s| s.dimmed()),
      );
    }
  }

  Ok(())
}
