//! Boolean presentation heuristics.
//!
//! Paramdefs store flags in narrow integers. A field is presented as `bool`
//! when its kind is one of the configured flag kinds and its type tag or
//! name matches one of the configured matchers. The matcher list is plain
//! data so new conventions can be added through configuration.

use crate::paramdef::types::{FieldDef, PrimitiveKind};
use regex::Regex;
use serde_derive::{Deserialize, Serialize};
use thiserror::Error;

/// Serializable form of a single matcher.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub enum BoolMatcherDef {
    /// The field's type tag contains this substring.
    TypeTagContains(String),
    /// The field's type tag equals this string.
    TypeTagEquals(String),
    /// The field's identifier matches this regular expression.
    NamePattern(String),
}

/// Serializable heuristic set, as found in generator config files.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct BoolHeuristicsDef {
    #[serde(default = "default_kinds")]
    pub kinds: Vec<PrimitiveKind>,
    #[serde(default = "default_matchers", with = "serde_yml::with::singleton_map_recursive")]
    pub matchers: Vec<BoolMatcherDef>,
}

impl Default for BoolHeuristicsDef {
    fn default() -> Self {
        Self {
            kinds: default_kinds(),
            matchers: default_matchers(),
        }
    }
}

fn default_kinds() -> Vec<PrimitiveKind> {
    vec![PrimitiveKind::U8, PrimitiveKind::Dummy8, PrimitiveKind::S8, PrimitiveKind::U16]
}

fn default_matchers() -> Vec<BoolMatcherDef> {
    let mut matchers: Vec<BoolMatcherDef> = ["BOOL", "YESNO", "ON_OFF"]
        .into_iter()
        .map(|tag| BoolMatcherDef::TypeTagContains(tag.to_string()))
        .collect();
    matchers.push(BoolMatcherDef::TypeTagEquals(
        "DefaultKeyAssignPrioritySuppression".to_string(),
    ));
    matchers.extend(
        [
            "^is",
            "^was",
            "^disable",
            "^invisibleFlag[0-9]",
            "^cumulateReset",
            "^enableLuck",
            "^modelDispMask[0-9]",
            "^slot[0-9]",
            "^b[A-Z]",
        ]
        .into_iter()
        .map(|pattern| BoolMatcherDef::NamePattern(pattern.to_string())),
    );
    matchers
}

#[derive(Debug, Error)]
pub enum HeuristicsError {
    #[error("invalid name pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A compiled matcher predicate.
#[derive(Debug, Clone)]
pub enum BoolMatcher {
    TypeTagContains(String),
    TypeTagEquals(String),
    NamePattern(Regex),
}

impl BoolMatcher {
    pub fn matches(&self, field: &FieldDef) -> bool {
        match self {
            BoolMatcher::TypeTagContains(needle) => field.internal_type.contains(needle.as_str()),
            BoolMatcher::TypeTagEquals(tag) => field.internal_type == *tag,
            BoolMatcher::NamePattern(re) => re.is_match(&field.internal_name),
        }
    }
}

/// Compiled heuristic set used by the layout resolver.
#[derive(Debug, Clone)]
pub struct BoolHeuristics {
    kinds: Vec<PrimitiveKind>,
    matchers: Vec<BoolMatcher>,
}

impl BoolHeuristics {
    pub fn compile(def: &BoolHeuristicsDef) -> Result<Self, HeuristicsError> {
        let matchers = def
            .matchers
            .iter()
            .map(|matcher| match matcher {
                BoolMatcherDef::TypeTagContains(s) => Ok(BoolMatcher::TypeTagContains(s.clone())),
                BoolMatcherDef::TypeTagEquals(s) => Ok(BoolMatcher::TypeTagEquals(s.clone())),
                BoolMatcherDef::NamePattern(pattern) => Regex::new(pattern)
                    .map(BoolMatcher::NamePattern)
                    .map_err(|source| HeuristicsError::InvalidPattern {
                        pattern: pattern.clone(),
                        source,
                    }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            kinds: def.kinds.clone(),
            matchers,
        })
    }

    /// Heuristics that never present anything as `bool`.
    pub fn disabled() -> Self {
        Self {
            kinds: Vec::new(),
            matchers: Vec::new(),
        }
    }

    /// Whether `field` should be presented as a boolean.
    pub fn is_bool(&self, field: &FieldDef) -> bool {
        let kind = field.display_type;
        if !self.kinds.contains(&kind) {
            return false;
        }
        /* Filler byte arrays only qualify as single values */
        if kind.is_array_type() && field.array_length != 0 {
            return false;
        }
        if field.bit_size >= 2 {
            return false;
        }
        self.matchers.iter().any(|m| m.matches(field))
    }
}

impl Default for BoolHeuristics {
    fn default() -> Self {
        match Self::compile(&BoolHeuristicsDef::default()) {
            Ok(heuristics) => heuristics,
            Err(e) => unreachable!("built-in bool heuristics must compile: {e}"),
        }
    }
}
