/* Codegen command - generate C++ or Rust layouts from paramdef schemas */

use super::common::{load_schemas, load_settings, resolve_all};
use crate::codegen::cpp::{CppCodeGenerator, CppCodeGeneratorOptions};
use crate::codegen::rust::{RustCodeGenerator, RustCodeGeneratorOptions};
use crate::codegen::{GeneratedFile, ParamCodeGen};
use crate::config::{Overrides, Settings};
use crate::paramdef::file::SchemaSet;
use crate::paramdef::resolved::ResolvedParamdef;
use anyhow::Context;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Language {
  Cpp,
  Rust,
}

pub struct CodegenOptions {
  pub defs_dir: PathBuf,
  pub params: Option<PathBuf>,
  pub language: Language,
  pub output_dir: PathBuf,
  pub config: Option<PathBuf>,
  pub overrides: Overrides,
  pub verbose: bool,
}

/* Files produced for one schema */
struct SchemaOutput {
  param_type: String,
  param_names: Vec<String>,
  files: Vec<GeneratedFile>,
}

/* Execute the codegen command */
pub fn run(options: CodegenOptions) -> anyhow::Result<()> {
  let verbose = options.verbose;
  if verbose {
    println!("Paramdef Generator - Code Generation Tool");
    println!("=========================================\n");
    println!("[~] Configuration:");
    println!("  Language: {:?}", options.language);
    println!("  Definitions: {}", options.defs_dir.display());
    if let Some(params) = &options.params {
      println!("  Param manifest: {}", params.display());
    }
    println!("  Output directory: {}", options.output_dir.display());
    println!();
  }

  let settings = load_settings(options.config.as_deref(), options.overrides.clone(), verbose)?;
  let schemas = load_schemas(&options.defs_dir, options.params.as_deref(), verbose)?;

  let generator = make_generator(options.language, &settings);
  generate_code(generator.as_ref(), &schemas, &settings, &options.output_dir, verbose)
}

pub fn make_generator(language: Language, settings: &Settings) -> Box<dyn ParamCodeGen> {
  match language {
    Language::Cpp => Box::new(CppCodeGenerator::new(CppCodeGeneratorOptions {
      write_comments: settings.write_comments,
      ..CppCodeGeneratorOptions::default()
    })),
    Language::Rust => Box::new(RustCodeGenerator::new(RustCodeGeneratorOptions {
      write_comments: settings.write_comments,
      ..RustCodeGeneratorOptions::default()
    })),
  }
}

/* Generate every schema's files, then the common files tying them together */
pub fn generate_code(
  generator: &dyn ParamCodeGen,
  schemas: &SchemaSet,
  settings: &Settings,
  output_dir: &Path,
  verbose: bool,
) -> anyhow::Result<()> {
  if verbose {
    println!("[~] Resolving layouts...");
  }

  /* Params whose paramdef was never loaded have nothing to wrap */
  for param in &schemas.manifest.params {
    if !schemas.paramdefs.contains_key(&param.param_type) {
      log::warn!("param '{}' uses unknown paramdef '{}'; skipping", param.name, param.param_type);
    }
  }

  let mut outputs = Vec::new();
  let mut failures = Vec::new();
  for result in resolve_all(schemas, settings) {
    match result.layout {
      Ok(layout) => outputs.push(layout),
      Err(e) => {
        println!("[✗] {}: {}", result.param_type, e);
        failures.push(result.param_type);
      }
    }
  }

  /* Each schema is rendered in full before anything is written */
  let rendered: Vec<SchemaOutput> = outputs.par_iter().map(|layout| render_schema(generator, schemas, layout)).collect();

  std::fs::create_dir_all(output_dir)
    .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

  let mut paramdef_types = Vec::new();
  let mut param_names = Vec::new();
  for output in &rendered {
    for file in &output.files {
      write_generated(output_dir, file)?;
    }
    if verbose {
      println!("[✓] {} ({} file(s))", output.param_type, output.files.len());
    }
    paramdef_types.push(output.param_type.clone());
    param_names.extend(output.param_names.iter().cloned());
  }

  for file in generator.gen_common_files(&paramdef_types, &param_names) {
    write_generated(output_dir, &file)?;
  }

  if verbose {
    println!(
      "\n[~] Generated {} paramdef(s) and {} param(s) in {}",
      paramdef_types.len(),
      param_names.len(),
      output_dir.display()
    );
  }

  if !failures.is_empty() {
    anyhow::bail!("{} paramdef(s) failed to generate: {}", failures.len(), failures.join(", "));
  }

  Ok(())
}

fn render_schema(generator: &dyn ParamCodeGen, schemas: &SchemaSet, layout: &ResolvedParamdef) -> SchemaOutput {
  let mut files = vec![GeneratedFile {
    path: generator.paramdef_path(&layout.param_type),
    contents: generator.gen_paramdef_code(layout),
  }];

  let mut param_names = Vec::new();
  for param in schemas.manifest.params.iter().filter(|p| p.param_type == layout.param_type) {
    files.push(GeneratedFile {
      path: generator.param_path(&param.name),
      contents: generator.gen_param_code(param, layout),
    });
    param_names.push(param.name.clone());
  }

  SchemaOutput { param_type: layout.param_type.clone(), param_names, files }
}

fn write_generated(output_dir: &Path, file: &GeneratedFile) -> anyhow::Result<()> {
  let path = output_dir.join(&file.path);
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).with_context(|| format!("Failed to create directory {}", parent.display()))?;
  }
  std::fs::write(&path, &file.contents).with_context(|| format!("Failed to write {}", path.display()))?;
  log::debug!("wrote {}", path.display());
  Ok(())
}
