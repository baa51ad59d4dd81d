use anyhow::{Context, Result};

use libforge_lib::Error;
use libforge_lib::steps;
use libforge_lib::task::Executor;

use crate::output::{OutputFormat, print_json};

pub fn cmd_plan(task: &str, format: OutputFormat) -> Result<()> {
  let registry = steps::default_registry()
    .map_err(Error::from)
    .context("task registry is invalid")?;
  let order = Executor::new(&registry).plan(task).map_err(Error::from)?;

  if format.is_json() {
    print_json(&serde_json::json!({ "task": task, "order": order }))?;
  } else {
    for (i, name) in order.iter().enumerate() {
      println!("{:>2}. {}", i + 1, name);
    }
  }

  Ok(())
}
