/* Field name disambiguation */

use crate::paramdef::types::{FieldDef, NOT_A_BITFIELD, Paramdef};
use indexmap::IndexMap;
use serde_derive::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Strategy used to make internal field names unique within a paramdef.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UniqueNameMethod {
  /// Internal field names are left unchanged.
  None,
  /// Number fields whose name repeats; unique fields keep their name.
  #[default]
  Counter,
  /// Append the field's byte offset to every name.
  Offset,
  /// Like `Counter`, but unique fields are numbered too.
  CounterNumberAll,
}

/// How numeric suffixes are rendered.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NumberFormat {
  Decimal { width: usize },
  Hex { width: usize, upper: bool },
}

impl NumberFormat {
  pub fn format(&self, value: u64) -> String {
    match *self {
      NumberFormat::Decimal { width } => format!("{:0width$}", value, width = width),
      NumberFormat::Hex { width, upper: true } => format!("{:0width$X}", value, width = width),
      NumberFormat::Hex { width, upper: false } => format!("{:0width$x}", value, width = width),
    }
  }

  /* Format used when the caller does not pick one */
  fn default_for(method: UniqueNameMethod) -> Self {
    match method {
      UniqueNameMethod::Offset => NumberFormat::Hex { width: 3, upper: true },
      _ => NumberFormat::Decimal { width: 0 },
    }
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NumberFormatError {
  #[error("number format is empty")]
  Empty,
  #[error("unknown number format '{0}', expected d<width>, x<width> or X<width>")]
  UnknownSpecifier(String),
  #[error("invalid width in number format '{0}'")]
  InvalidWidth(String),
}

impl FromStr for NumberFormat {
  type Err = NumberFormatError;

  /* Parses `d2`, `x3`, `X3`; the width is optional */
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let mut chars = s.chars();
    let specifier = chars.next().ok_or(NumberFormatError::Empty)?;
    let rest = chars.as_str();
    let width = if rest.is_empty() {
      0
    } else {
      rest.parse::<usize>().map_err(|_| NumberFormatError::InvalidWidth(s.to_string()))?
    };

    match specifier {
      'd' | 'D' => Ok(NumberFormat::Decimal { width }),
      'x' => Ok(NumberFormat::Hex { width, upper: false }),
      'X' => Ok(NumberFormat::Hex { width, upper: true }),
      _ => Err(NumberFormatError::UnknownSpecifier(s.to_string())),
    }
  }
}

/* Bits a field advances the offset cursor by */
fn field_bits(field: &FieldDef) -> u64 {
  if field.bit_size == NOT_A_BITFIELD {
    let size = field.display_type.value_size();
    if field.display_type.is_array_type() {
      8 * size * field.array_length.max(0) as u64
    } else {
      8 * size
    }
  } else {
    field.bit_size.max(0) as u64
  }
}

/// Computes unique identifiers for `fields` under `method`.
///
/// The returned vector is index-aligned with `fields`. The input is not
/// modified; callers decide whether to apply the new names.
pub fn disambiguate(fields: &[FieldDef], method: UniqueNameMethod, format: Option<NumberFormat>) -> Vec<String> {
  let format = format.unwrap_or_else(|| NumberFormat::default_for(method));
  let mut names: Vec<String> = fields.iter().map(|f| f.internal_name.clone()).collect();
  let mut same_name_fields: IndexMap<&str, Vec<usize>> = IndexMap::new();
  let mut bit_offset: u64 = 0;

  for (i, field) in fields.iter().enumerate() {
    let seen = same_name_fields.entry(field.internal_name.as_str()).or_default();

    match method {
      UniqueNameMethod::None => {}
      UniqueNameMethod::Counter => {
        if seen.len() == 1 {
          let first = seen[0];
          names[first].push_str(&format!("_{}", format.format(0)));
        }
        if !seen.is_empty() {
          names[i].push_str(&format!("_{}", format.format(seen.len() as u64)));
        }
      }
      UniqueNameMethod::Offset => {
        names[i].push_str(&format!("_{}", format.format(bit_offset / 8)));
      }
      UniqueNameMethod::CounterNumberAll => {
        names[i].push_str(&format!("_{}", format.format(seen.len() as u64)));
      }
    }

    seen.push(i);
    bit_offset += field_bits(field);
  }

  log::debug!(
    "disambiguated {} field(s) with {:?}, {} distinct raw name(s)",
    fields.len(),
    method,
    same_name_fields.len()
  );

  names
}

/// Rewrites the internal names of `def` in place so they are unique.
pub fn make_internal_names_unique(def: &mut Paramdef, method: UniqueNameMethod, format: Option<NumberFormat>) {
  let names = disambiguate(&def.fields, method, format);
  for (field, name) in def.fields.iter_mut().zip(names) {
    field.internal_name = name;
  }
}

/// Returns the indices of the first two fields sharing an identifier.
pub fn find_duplicate(fields: &[FieldDef]) -> Option<(usize, usize)> {
  let mut first_seen: HashMap<&str, usize> = HashMap::with_capacity(fields.len());
  for (i, field) in fields.iter().enumerate() {
    if let Some(&first) = first_seen.get(field.internal_name.as_str()) {
      return Some((first, i));
    }
    first_seen.insert(field.internal_name.as_str(), i);
  }
  None
}
