/* Common utilities shared between analyze and codegen commands */

use crate::config::{Overrides, Settings};
use crate::paramdef::file::SchemaSet;
use crate::paramdef::resolved::{LayoutError, LayoutResolver, ResolvedParamdef};
use crate::paramdef::types::Paramdef;
use crate::paramdef::unique::make_internal_names_unique;
use anyhow::Context;
use rayon::prelude::*;
use std::path::Path;

/* Disambiguate names, then resolve the layout of one schema */
pub fn resolve_paramdef(
  def: &Paramdef,
  settings: &Settings,
  detected_size: Option<u64>,
) -> Result<ResolvedParamdef, LayoutError> {
  let mut def = def.clone();
  make_internal_names_unique(&mut def, settings.unique_names, settings.number_format);
  LayoutResolver::new(&settings.heuristics).resolve(&def, detected_size)
}

/* Build settings from the config file and command line */
pub fn load_settings(config: Option<&Path>, overrides: Overrides, verbose: bool) -> anyhow::Result<Settings> {
  if verbose {
    match config {
      Some(path) => println!("[~] Loading config from {}", path.display()),
      None => println!("[~] No config file, using built-in defaults"),
    }
  }
  let settings = Settings::from_sources(config, overrides).context("Failed to load generator configuration")?;

  if verbose {
    println!("  Unique names: {:?}", settings.unique_names);
    if let Some(format) = &settings.number_format {
      println!("  Number format: {:?}", format);
    }
    println!("  Write comments: {}", settings.write_comments);
    println!();
  }

  Ok(settings)
}

/* Load every schema in a directory plus the optional manifest */
pub fn load_schemas(defs_dir: &Path, params: Option<&Path>, verbose: bool) -> anyhow::Result<SchemaSet> {
  if verbose {
    println!("[~] Loading paramdefs from {}...", defs_dir.display());
  }

  let schemas = SchemaSet::load(defs_dir, params)
    .with_context(|| format!("Failed to load paramdefs from {}", defs_dir.display()))?;

  if verbose {
    println!("[~] Loaded {} paramdef(s)", schemas.len());
    for (param_type, loaded) in &schemas.paramdefs {
      println!("  - {} ({} fields, {})", param_type, loaded.def.fields.len(), loaded.path.display());
    }
    if params.is_some() {
      println!("[~] Manifest lists {} param(s)", schemas.manifest.params.len());
    }
    println!();
  }

  if schemas.is_empty() {
    log::warn!("no paramdef files found in {}", defs_dir.display());
  }

  Ok(schemas)
}

/* Outcome of resolving one schema */
pub struct SchemaResult {
  pub param_type: String,
  pub layout: Result<ResolvedParamdef, LayoutError>,
}

/* Resolve every schema in parallel, keeping load order */
pub fn resolve_all(schemas: &SchemaSet, settings: &Settings) -> Vec<SchemaResult> {
  let loaded: Vec<_> = schemas.paramdefs.values().collect();
  loaded
    .par_iter()
    .map(|loaded| SchemaResult {
      param_type: loaded.def.param_type.clone(),
      layout: resolve_paramdef(&loaded.def, settings, schemas.detected_size(&loaded.def.param_type)),
    })
    .collect()
}
