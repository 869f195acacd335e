/* Paramdef and param manifest loading */

use crate::paramdef::types::{ParamManifest, Paramdef};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/* Extensions recognized as paramdef files inside a definitions directory */
const PARAMDEF_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

#[derive(Debug, Error)]
pub enum LoadError {
  #[error("failed to read '{path}': {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("failed to parse '{path}': {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_yml::Error,
  },
  #[error("'{0}' is not a directory")]
  NotADirectory(PathBuf),
}

fn read(path: &Path) -> Result<String, LoadError> {
  std::fs::read_to_string(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })
}

/* Load a single paramdef file (YAML, or JSON since YAML is a superset) */
pub fn load_paramdef(path: &Path) -> Result<Paramdef, LoadError> {
  let text = read(path)?;
  serde_yml::from_str(&text).map_err(|source| LoadError::Parse { path: path.to_path_buf(), source })
}

/* Load the param manifest listing named params and detected row sizes */
pub fn load_manifest(path: &Path) -> Result<ParamManifest, LoadError> {
  let text = read(path)?;
  serde_yml::from_str(&text).map_err(|source| LoadError::Parse { path: path.to_path_buf(), source })
}

/* A paramdef together with the file it came from */
#[derive(Debug, Clone)]
pub struct LoadedParamdef {
  pub path: PathBuf,
  pub def: Paramdef,
}

/* Every schema loaded for one generator run */
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
  /* Keyed by paramdef type name, in load order */
  pub paramdefs: IndexMap<String, LoadedParamdef>,
  pub manifest: ParamManifest,
}

impl SchemaSet {
  /* Load every paramdef file in `defs_dir`, sorted by file name */
  pub fn load(defs_dir: &Path, manifest_path: Option<&Path>) -> Result<Self, LoadError> {
    if !defs_dir.is_dir() {
      return Err(LoadError::NotADirectory(defs_dir.to_path_buf()));
    }

    let entries = std::fs::read_dir(defs_dir).map_err(|source| LoadError::Io { path: defs_dir.to_path_buf(), source })?;
    let mut files = Vec::new();
    for entry in entries {
      let entry = entry.map_err(|source| LoadError::Io { path: defs_dir.to_path_buf(), source })?;
      let path = entry.path();
      let is_paramdef = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| PARAMDEF_EXTENSIONS.contains(&ext));
      if path.is_file() && is_paramdef {
        files.push(path);
      }
    }
    files.sort();

    let mut set = SchemaSet::default();
    for path in files {
      let def = load_paramdef(&path)?;
      set.insert(path, def);
    }

    if let Some(manifest_path) = manifest_path {
      set.manifest = load_manifest(manifest_path)?;
    }

    Ok(set)
  }

  /* Add a paramdef; a second definition of the same type is ignored */
  pub fn insert(&mut self, path: PathBuf, def: Paramdef) {
    if let Some(existing) = self.paramdefs.get(&def.param_type) {
      log::warn!(
        "paramdef '{}' from {} already loaded from {}; ignoring",
        def.param_type,
        path.display(),
        existing.path.display()
      );
      return;
    }
    self.paramdefs.insert(def.param_type.clone(), LoadedParamdef { path, def });
  }

  pub fn detected_size(&self, param_type: &str) -> Option<u64> {
    self.manifest.detected_size(param_type)
  }

  pub fn len(&self) -> usize {
    self.paramdefs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.paramdefs.is_empty()
  }
}
