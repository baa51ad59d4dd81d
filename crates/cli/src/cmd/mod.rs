mod list;
mod plan;
mod platforms;
mod run;

pub use list::cmd_list;
pub use plan::cmd_plan;
pub use platforms::cmd_platforms;
pub use run::cmd_run;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use libforge_lib::Error;
use libforge_lib::config::RawConfig;
use libforge_lib::context::BuildContext;

/// Load the configuration file, expand `$NAME` references from the process
/// environment and validate it.
pub(crate) fn load_context(path: &Path) -> Result<BuildContext> {
  let raw = RawConfig::load(path)
    .map_err(Error::from)?
    .interpolate(|name| std::env::var(name).ok())
    .map_err(Error::from)
    .with_context(|| format!("failed to expand variables in {}", path.display()))?;

  let ctx = BuildContext::from_config(&raw)
    .map_err(Error::from)
    .with_context(|| format!("invalid configuration in {}", path.display()))?;
  debug!(config = ?path, root = ?ctx.layout().root(), platforms = ctx.platforms().len(), "loaded configuration");
  Ok(ctx)
}
