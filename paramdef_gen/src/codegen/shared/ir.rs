//! Language-neutral layout IR for resolved paramdefs.
//!
//! The IR records what the resolver decided for every field (its
//! classification, storage offset and bitfield placement) so that tooling can
//! inspect layouts without re-running the classification rules.
//!
//! # Example
//! ```
//! use paramdef_gen::codegen::shared::ir::*;
//!
//! let layout = LayoutIr::new(vec![]);
//! assert_eq!(layout.version, IR_SCHEMA_VERSION);
//! ```

use crate::codegen::helpers::hex_literal;
use crate::paramdef::resolved::{
    BitfieldGroup, DefaultLiteral, FieldClass, Presentation, ResolvedField, ResolvedParamdef,
    ZeroSizeReason,
};
use serde_derive::{Deserialize, Serialize};

/// Schema version used for every serialized IR export.
pub const IR_SCHEMA_VERSION: u32 = 1;

/// Container for the layouts of every paramdef in one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutIr {
    /// IR schema version (mirrors `IR_SCHEMA_VERSION`).
    pub version: u32,
    pub paramdefs: Vec<ParamdefIr>,
}

impl LayoutIr {
    pub fn new(paramdefs: Vec<ParamdefIr>) -> Self {
        Self {
            version: IR_SCHEMA_VERSION,
            paramdefs,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParamdefIr {
    pub param_type: String,
    pub data_version: i32,
    pub big_endian: bool,
    pub unicode: bool,
    pub format_version: i32,
    /// Bytes of storage computed from the layout.
    pub size: u64,
    /// Size observed in regulation data, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_size: Option<u64>,
    pub fields: Vec<FieldIr>,
    #[serde(default)]
    pub groups: Vec<GroupIr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FieldIr {
    pub name: String,
    /// Primitive kind tag (`u8`, `fixstrW`, ...).
    pub kind: String,
    pub internal_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    /// True when emitted as a boolean.
    #[serde(default)]
    pub is_bool: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    pub layout: FieldLayoutIr,
}

/// Classification of a field, tagged by its rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "kebab-case")]
pub enum FieldLayoutIr {
    SizedScalar {
        size: u64,
    },
    #[serde(rename_all = "kebab-case")]
    SizedArray {
        length: u64,
        element_size: u64,
    },
    ZeroSize {
        reason: String,
    },
    #[serde(rename_all = "kebab-case")]
    BitfieldMember {
        group: u32,
        bit_offset: u32,
        bit_width: u32,
        /// Mask rendered at the storage width, e.g. `0x0E`.
        mask: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GroupIr {
    pub id: u32,
    pub name: String,
    pub storage: String,
    pub offset: u64,
    pub capacity: u32,
    pub used_bits: u32,
    /// Names of the member fields, lowest bits first.
    pub members: Vec<String>,
}

fn default_text(default: &DefaultLiteral) -> String {
    match default {
        DefaultLiteral::Bool(value) => value.to_string(),
        DefaultLiteral::Float(text) | DefaultLiteral::Int(text) => text.clone(),
    }
}

fn zero_size_reason(reason: ZeroSizeReason) -> &'static str {
    match reason {
        ZeroSizeReason::NonPackableBits => "non-packable-bits",
        ZeroSizeReason::EmptyArray => "empty-array",
    }
}

impl FieldIr {
    fn from_resolved(field: &ResolvedField, layout: &ResolvedParamdef) -> Self {
        let layout_ir = match &field.class {
            FieldClass::SizedScalar { size } => FieldLayoutIr::SizedScalar { size: *size },
            FieldClass::SizedArray {
                length,
                element_size,
            } => FieldLayoutIr::SizedArray {
                length: *length,
                element_size: *element_size,
            },
            FieldClass::ZeroSize { reason } => FieldLayoutIr::ZeroSize {
                reason: zero_size_reason(*reason).to_string(),
            },
            FieldClass::BitfieldMember {
                group,
                bit_offset,
                bit_width,
                mask,
                ..
            } => {
                let storage_size = layout
                    .group(*group)
                    .map(|g| g.storage.value_size())
                    .unwrap_or(4);
                FieldLayoutIr::BitfieldMember {
                    group: *group as u32,
                    bit_offset: *bit_offset,
                    bit_width: *bit_width,
                    mask: hex_literal(*mask, storage_size),
                }
            }
        };

        Self {
            name: field.name.clone(),
            kind: field.kind.as_str().to_string(),
            internal_type: field.internal_type.clone(),
            offset: field.offset,
            is_bool: field.presentation == Presentation::Bool,
            default: field.default.as_ref().map(default_text),
            layout: layout_ir,
        }
    }
}

impl GroupIr {
    fn from_resolved(group: &BitfieldGroup, layout: &ResolvedParamdef) -> Self {
        Self {
            id: group.id as u32,
            name: group.name.clone(),
            storage: group.storage.as_str().to_string(),
            offset: group.offset,
            capacity: group.capacity,
            used_bits: group.used_bits,
            members: group
                .members
                .iter()
                .filter_map(|&i| layout.fields.get(i).map(|f| f.name.clone()))
                .collect(),
        }
    }
}

impl From<&ResolvedParamdef> for ParamdefIr {
    fn from(layout: &ResolvedParamdef) -> Self {
        Self {
            param_type: layout.param_type.clone(),
            data_version: layout.data_version,
            big_endian: layout.big_endian,
            unicode: layout.unicode,
            format_version: layout.format_version,
            size: layout.size,
            detected_size: layout.detected_size,
            fields: layout
                .fields
                .iter()
                .map(|f| FieldIr::from_resolved(f, layout))
                .collect(),
            groups: layout
                .groups
                .iter()
                .map(|g| GroupIr::from_resolved(g, layout))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paramdef::heuristics::BoolHeuristics;
    use crate::paramdef::resolved::LayoutResolver;
    use crate::paramdef::types::{FieldDef, Paramdef, PrimitiveKind};

    #[test]
    fn ir_mirrors_the_resolved_layout() {
        let def = Paramdef::new(
            "IR_TEST_ST",
            vec![
                FieldDef::new("isOn", PrimitiveKind::U8).with_bits(1),
                FieldDef::new("mode", PrimitiveKind::U8).with_bits(3),
                FieldDef::new("level", PrimitiveKind::U8).with_bits(4),
                FieldDef::new("none", PrimitiveKind::Dummy8).with_array_length(0),
                FieldDef::new("hp", PrimitiveKind::S32).with_default(100.0),
            ],
        );
        let heuristics = BoolHeuristics::default();
        let layout = LayoutResolver::new(&heuristics).resolve(&def, Some(8)).unwrap();
        let ir = ParamdefIr::from(&layout);

        assert_eq!(ir.size, 5);
        assert_eq!(ir.detected_size, Some(8));
        assert!(ir.fields[0].is_bool);
        assert_eq!(
            ir.fields[1].layout,
            FieldLayoutIr::BitfieldMember {
                group: 1,
                bit_offset: 1,
                bit_width: 3,
                mask: "0x0E".to_string(),
            }
        );
        assert_eq!(
            ir.fields[3].layout,
            FieldLayoutIr::ZeroSize {
                reason: "empty-array".to_string()
            }
        );
        assert_eq!(ir.fields[4].offset, Some(1));
        assert_eq!(ir.fields[4].default.as_deref(), Some("100"));
        assert_eq!(ir.groups[0].members, vec!["isOn", "mode", "level"]);
        assert_eq!(ir.groups[0].used_bits, 8);
    }
}
