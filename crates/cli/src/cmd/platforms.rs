//! `libforge platforms`: where each configured platform's libraries live.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use libforge_lib::artifact::ArtifactProbe;
use libforge_lib::platform::Platform;
use libforge_lib::steps::{IosPackage, OpenSsl, Recipe, SqlCipher, Sqlite4Java};

use crate::output::{OutputFormat, print_json, print_stat, print_success};

#[derive(Debug, Serialize)]
struct ArtifactRow {
  step: &'static str,
  path: String,
  built: bool,
}

#[derive(Debug, Serialize)]
struct PlatformRow {
  platform: Platform,
  artifacts: Vec<ArtifactRow>,
}

fn rows_for(probe: &ArtifactProbe<'_>, platform: &Platform) -> Result<Vec<ArtifactRow>> {
  let recipes: [(&'static str, &dyn Recipe); 4] = [
    ("build-openssl", &OpenSsl),
    ("build-sqlcipher", &SqlCipher),
    ("build-sqlite4java", &Sqlite4Java),
    ("package-ios", &IosPackage),
  ];

  let mut rows = Vec::new();
  for (step, recipe) in recipes {
    if recipe.skip_reason(platform).is_some() {
      continue;
    }
    let artifact = recipe.artifact(platform)?;
    rows.push(ArtifactRow {
      step,
      path: probe.path(&artifact)?.display().to_string(),
      built: probe.exists(&artifact)?,
    });
  }
  Ok(rows)
}

pub fn cmd_platforms(config: &Path, format: OutputFormat) -> Result<()> {
  let ctx = super::load_context(config)?;
  let probe = ArtifactProbe::new(ctx.layout());

  let rows = ctx
    .platforms()
    .iter()
    .map(|platform| {
      Ok(PlatformRow {
        platform: platform.clone(),
        artifacts: rows_for(&probe, platform)?,
      })
    })
    .collect::<Result<Vec<_>>>()?;

  if format.is_json() {
    return print_json(&rows);
  }

  for row in rows {
    print_success(&row.platform.to_string());
    for artifact in row.artifacts {
      let state = if artifact.built { "built" } else { "missing" };
      print_stat(artifact.step, &format!("{} ({})", artifact.path, state));
    }
  }
  Ok(())
}
