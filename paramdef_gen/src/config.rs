//! Generator configuration.
//!
//! Settings come from an optional YAML file and are then overridden by
//! command-line flags. Every setting has a built-in default, so running
//! without a config file reproduces the stock behavior.

use crate::paramdef::heuristics::{BoolHeuristics, BoolHeuristicsDef, HeuristicsError};
use crate::paramdef::unique::{NumberFormat, NumberFormatError, UniqueNameMethod};
use serde_derive::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// On-disk configuration, as written by users.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub unique_names: Option<UniqueNameMethod>,
    /// Suffix format such as `d2`, `x3` or `X3`.
    #[serde(default)]
    pub number_format: Option<String>,
    #[serde(default)]
    pub write_comments: Option<bool>,
    #[serde(default)]
    pub bool_heuristics: Option<BoolHeuristicsDef>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },
    #[error(transparent)]
    NumberFormat(#[from] NumberFormatError),
    #[error(transparent)]
    Heuristics(#[from] HeuristicsError),
}

impl GeneratorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yml::Error> {
        serde_yml::from_str(text)
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub unique_names: Option<UniqueNameMethod>,
    pub number_format: Option<String>,
    pub write_comments: Option<bool>,
}

/// Fully resolved settings used by the pipeline.
#[derive(Debug, Clone)]
pub struct Settings {
    pub unique_names: UniqueNameMethod,
    pub number_format: Option<NumberFormat>,
    pub write_comments: bool,
    pub heuristics: BoolHeuristics,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            unique_names: UniqueNameMethod::Counter,
            number_format: None,
            write_comments: false,
            heuristics: BoolHeuristics::default(),
        }
    }
}

impl Settings {
    /// Merges the config file (if any) with command-line overrides.
    pub fn build(config: Option<&GeneratorConfig>, overrides: Overrides) -> Result<Self, ConfigError> {
        let file = config.cloned().unwrap_or_default();

        let number_format = match overrides.number_format.or(file.number_format) {
            Some(format) => Some(format.parse::<NumberFormat>()?),
            None => None,
        };
        let heuristics = match &file.bool_heuristics {
            Some(def) => BoolHeuristics::compile(def)?,
            None => BoolHeuristics::default(),
        };

        Ok(Self {
            unique_names: overrides
                .unique_names
                .or(file.unique_names)
                .unwrap_or_default(),
            number_format,
            write_comments: overrides.write_comments.or(file.write_comments).unwrap_or(false),
            heuristics,
        })
    }

    /// Loads `path` when given and builds settings from it.
    pub fn from_sources(path: Option<&Path>, overrides: Overrides) -> Result<Self, ConfigError> {
        let config = path.map(GeneratorConfig::load).transpose()?;
        Self::build(config.as_ref(), overrides)
    }
}
