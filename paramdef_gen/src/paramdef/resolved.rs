use crate::paramdef::bitfield::{field_mask, take_group, truncate_const};
use crate::paramdef::heuristics::BoolHeuristics;
use crate::paramdef::types::{FieldDef, NOT_A_BITFIELD, Paramdef, PrimitiveKind};
use crate::paramdef::unique::find_duplicate;
use thiserror::Error;

/* How a field is presented in emitted code */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
  Native,
  Bool,
}

/* Inline initializer decided for a field */
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultLiteral {
  Bool(bool),
  /* Always carries a fractional part, without a type suffix */
  Float(String),
  Int(String),
}

impl DefaultLiteral {
  pub fn new(value: f64, kind: PrimitiveKind, presentation: Presentation) -> Self {
    if presentation == Presentation::Bool {
      return DefaultLiteral::Bool(value != 0.0);
    }
    let text = value.to_string();
    if kind.is_float() {
      if text.contains('.') {
        DefaultLiteral::Float(text)
      } else {
        DefaultLiteral::Float(format!("{}.0", text))
      }
    } else {
      DefaultLiteral::Int(text)
    }
  }
}

/* Bits a member default contributes to its group word; bool literals pack as 0 or 1 */
fn packed_default(literal: &DefaultLiteral, raw: Option<f64>, bit_width: u32) -> u32 {
  let value = match (literal, raw) {
    (DefaultLiteral::Bool(state), _) => u32::from(*state),
    (_, Some(raw)) => raw as i64 as u32,
    (_, None) => 0,
  };
  value & field_mask(0, bit_width)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZeroSizeReason {
  /* Declared a bit-size on a kind that cannot be packed */
  NonPackableBits,
  /* Array length of zero or less */
  EmptyArray,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldClass {
  SizedScalar { size: u64 },
  SizedArray { length: u64, element_size: u64 },
  ZeroSize { reason: ZeroSizeReason },
  BitfieldMember { group: usize, bit_offset: u32, bit_width: u32, mask: u32, clear_mask: u32 },
}

impl FieldClass {
  pub fn label(&self) -> &'static str {
    match self {
      FieldClass::SizedScalar { .. } => "sized-scalar",
      FieldClass::SizedArray { .. } => "sized-array",
      FieldClass::ZeroSize { .. } => "zero-size",
      FieldClass::BitfieldMember { .. } => "bitfield-member",
    }
  }

  pub fn is_zero_size(&self) -> bool {
    matches!(self, FieldClass::ZeroSize { .. })
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
  pub index: usize,
  pub name: String,
  pub kind: PrimitiveKind,
  pub internal_type: String,
  pub bit_size: i32,
  pub array_length: i32,
  pub presentation: Presentation,
  pub class: FieldClass,
  pub offset: Option<u64>, // None for zero-size fields
  pub default: Option<DefaultLiteral>,
  pub display_name: Option<String>,
  pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitfieldGroup {
  pub id: usize, // 1-based
  pub name: String,
  pub storage: PrimitiveKind,
  pub capacity: u32,
  pub offset: u64,
  pub members: Vec<usize>,
  pub used_bits: u32,
  /* Storage word with every member default packed in */
  pub default_value: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParamdef {
  pub param_type: String,
  pub data_version: i32,
  pub big_endian: bool,
  pub unicode: bool,
  pub format_version: i32,
  pub fields: Vec<ResolvedField>,
  pub groups: Vec<BitfieldGroup>,
  /* Storage size computed from the layout, without trailing alignment */
  pub size: u64,
  pub detected_size: Option<u64>,
}

impl ResolvedParamdef {
  pub fn group(&self, id: usize) -> Option<&BitfieldGroup> {
    id.checked_sub(1).and_then(|i| self.groups.get(i))
  }

  /* Group whose storage member is emitted at this field, if the field opens one */
  pub fn group_opened_by(&self, field_index: usize) -> Option<&BitfieldGroup> {
    self.groups.iter().find(|g| g.members.first() == Some(&field_index))
  }

  pub fn field(&self, name: &str) -> Option<&ResolvedField> {
    self.fields.iter().find(|f| f.name == name)
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
  #[error("paramdef '{param_type}' has duplicate field '{name}' at indices {first} and {second}")]
  DuplicateField { param_type: String, name: String, first: usize, second: usize },
}

pub struct LayoutResolver<'a> {
  heuristics: &'a BoolHeuristics,
}

impl<'a> LayoutResolver<'a> {
  pub fn new(heuristics: &'a BoolHeuristics) -> Self {
    Self { heuristics }
  }

  /* Resolve every field of an already disambiguated paramdef */
  pub fn resolve(&self, def: &Paramdef, detected_size: Option<u64>) -> Result<ResolvedParamdef, LayoutError> {
    if let Some((first, second)) = find_duplicate(&def.fields) {
      return Err(LayoutError::DuplicateField {
        param_type: def.param_type.clone(),
        name: def.fields[second].internal_name.clone(),
        first,
        second,
      });
    }

    let mut fields = Vec::with_capacity(def.fields.len());
    let mut groups: Vec<BitfieldGroup> = Vec::new();
    let mut offset: u64 = 0;
    let mut i = 0;

    while i < def.fields.len() {
      /* Rule 1: bit-packable fields with a width are grouped */
      if let Some((plan, next)) = take_group(&def.fields, i) {
        let id = groups.len() + 1;
        let storage_size = plan.storage.value_size();
        let mut default_value = 0;
        for member in &plan.members {
          let field = &def.fields[member.field_index];
          let mask = member.mask();
          let class = FieldClass::BitfieldMember {
            group: id,
            bit_offset: member.bit_offset,
            bit_width: member.bit_width,
            mask: truncate_const(mask, storage_size),
            clear_mask: truncate_const(!mask, storage_size),
          };
          let resolved = self.resolve_field(member.field_index, field, class, Some(offset));
          if let Some(literal) = &resolved.default {
            let value = packed_default(literal, field.default, member.bit_width);
            default_value = member.set(default_value, value);
          }
          fields.push(resolved);
        }
        groups.push(BitfieldGroup {
          id,
          name: format!("Bitfield{}", id),
          storage: plan.storage,
          capacity: plan.capacity,
          offset,
          members: plan.members.iter().map(|m| m.field_index).collect(),
          used_bits: plan.used_bits(),
          default_value,
        });
        offset += storage_size;
        i = next;
        continue;
      }

      let field = &def.fields[i];
      let kind = field.display_type;
      if kind == PrimitiveKind::Unknown {
        log::warn!(
          "field '{}' of '{}' has type tag '{}' with no known layout",
          field.internal_name,
          def.param_type,
          field.internal_type
        );
      }

      let class = if field.bit_size != NOT_A_BITFIELD {
        /* Rule 2: bit-size on something that is not packed */
        FieldClass::ZeroSize { reason: ZeroSizeReason::NonPackableBits }
      } else if kind.is_array_type() && field.array_length > 0 {
        /* Rule 3 */
        FieldClass::SizedArray { length: field.array_length as u64, element_size: kind.value_size() }
      } else if field.array_length <= 0 {
        /* Rule 4 */
        FieldClass::ZeroSize { reason: ZeroSizeReason::EmptyArray }
      } else {
        /* Rule 5 */
        FieldClass::SizedScalar { size: kind.value_size() }
      };

      let field_offset = match class {
        FieldClass::SizedScalar { size } => {
          let at = offset;
          offset += size;
          Some(at)
        }
        FieldClass::SizedArray { length, element_size } => {
          let at = offset;
          offset += length * element_size;
          Some(at)
        }
        _ => None,
      };

      fields.push(self.resolve_field(i, field, class, field_offset));
      i += 1;
    }

    Ok(ResolvedParamdef {
      param_type: def.param_type.clone(),
      data_version: def.data_version,
      big_endian: def.big_endian,
      unicode: def.unicode,
      format_version: def.format_version,
      fields,
      groups,
      size: offset,
      detected_size,
    })
  }

  fn resolve_field(&self, index: usize, field: &FieldDef, class: FieldClass, offset: Option<u64>) -> ResolvedField {
    let presentation = if self.heuristics.is_bool(field) { Presentation::Bool } else { Presentation::Native };

    /* Arrays are never default-initialized element-wise */
    let is_sized_array = field.display_type.is_array_type() && field.array_length > 0;
    let default = match field.default {
      Some(value) if !is_sized_array => Some(DefaultLiteral::new(value, field.display_type, presentation)),
      _ => None,
    };

    ResolvedField {
      index,
      name: field.internal_name.clone(),
      kind: field.display_type,
      internal_type: field.internal_type.clone(),
      bit_size: field.bit_size,
      array_length: field.array_length,
      presentation,
      class,
      offset,
      default,
      display_name: field.display_name.clone(),
      description: field.description.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn resolve(fields: Vec<FieldDef>) -> ResolvedParamdef {
    let heuristics = BoolHeuristics::default();
    let def = Paramdef::new("TEST_PARAM_ST", fields);
    LayoutResolver::new(&heuristics).resolve(&def, None).unwrap()
  }

  #[test]
  fn classification_follows_rule_order() {
    let layout = resolve(vec![
      FieldDef::new("flag", PrimitiveKind::U8).with_bits(1),
      FieldDef::new("signedBits", PrimitiveKind::S8).with_bits(4),
      FieldDef::new("name", PrimitiveKind::FixStrW).with_array_length(8),
      FieldDef::new("nothing", PrimitiveKind::Dummy8).with_array_length(0),
      FieldDef::new("hp", PrimitiveKind::S32),
    ]);

    assert_eq!(layout.fields[0].class.label(), "bitfield-member");
    assert_eq!(layout.fields[1].class, FieldClass::ZeroSize { reason: ZeroSizeReason::NonPackableBits });
    assert_eq!(layout.fields[2].class, FieldClass::SizedArray { length: 8, element_size: 2 });
    assert_eq!(layout.fields[3].class, FieldClass::ZeroSize { reason: ZeroSizeReason::EmptyArray });
    assert_eq!(layout.fields[4].class, FieldClass::SizedScalar { size: 4 });
  }

  #[test]
  fn offsets_and_size_skip_zero_size_fields() {
    let layout = resolve(vec![
      FieldDef::new("a", PrimitiveKind::U8).with_bits(1),
      FieldDef::new("b", PrimitiveKind::U8).with_bits(7),
      FieldDef::new("empty", PrimitiveKind::Dummy8).with_array_length(0),
      FieldDef::new("pad", PrimitiveKind::Dummy8).with_array_length(3),
      FieldDef::new("hp", PrimitiveKind::S32),
    ]);

    assert_eq!(layout.fields[0].offset, Some(0));
    assert_eq!(layout.fields[1].offset, Some(0));
    assert_eq!(layout.fields[2].offset, None);
    assert_eq!(layout.fields[3].offset, Some(1));
    assert_eq!(layout.fields[4].offset, Some(4));
    assert_eq!(layout.size, 8);
  }

  #[test]
  fn groups_are_numbered_per_schema() {
    let layout = resolve(vec![
      FieldDef::new("a", PrimitiveKind::U8).with_bits(4),
      FieldDef::new("b", PrimitiveKind::U8).with_bits(4),
      FieldDef::new("c", PrimitiveKind::U8).with_bits(1),
      FieldDef::new("d", PrimitiveKind::U16).with_bits(9),
    ]);

    let names: Vec<&str> = layout.groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["Bitfield1", "Bitfield2", "Bitfield3"]);
    assert_eq!(layout.groups[0].members, vec![0, 1]);
    assert_eq!(layout.group_opened_by(2).map(|g| g.id), Some(2));
    assert_eq!(layout.group(3).map(|g| g.storage), Some(PrimitiveKind::U16));
    assert_eq!(layout.size, 4);
  }

  #[test]
  fn masks_are_truncated_to_storage() {
    let layout = resolve(vec![
      FieldDef::new("lo", PrimitiveKind::U8).with_bits(1),
      FieldDef::new("mid", PrimitiveKind::U8).with_bits(3),
      FieldDef::new("hi", PrimitiveKind::U8).with_bits(4),
    ]);

    match layout.fields[1].class {
      FieldClass::BitfieldMember { mask, clear_mask, bit_offset, .. } => {
        assert_eq!(mask, 0x0E);
        assert_eq!(clear_mask, 0xF1);
        assert_eq!(bit_offset, 1);
      }
      ref other => panic!("unexpected class {:?}", other),
    }
    match layout.fields[2].class {
      FieldClass::BitfieldMember { mask, .. } => assert_eq!(mask, 0xF0),
      ref other => panic!("unexpected class {:?}", other),
    }
  }

  #[test]
  fn bool_defaults_follow_zero_test() {
    let layout = resolve(vec![
      FieldDef::new("isOn", PrimitiveKind::U8).with_default(0.0),
      FieldDef::new("isOff", PrimitiveKind::U8).with_default(2.0),
    ]);

    assert_eq!(layout.fields[0].presentation, Presentation::Bool);
    assert_eq!(layout.fields[0].default, Some(DefaultLiteral::Bool(false)));
    assert_eq!(layout.fields[1].default, Some(DefaultLiteral::Bool(true)));
  }

  #[test]
  fn float_defaults_always_have_a_fraction() {
    let layout = resolve(vec![
      FieldDef::new("scale", PrimitiveKind::F32).with_default(1.0),
      FieldDef::new("rate", PrimitiveKind::F32).with_default(0.25),
      FieldDef::new("count", PrimitiveKind::S32).with_default(-1.0),
    ]);

    assert_eq!(layout.fields[0].default, Some(DefaultLiteral::Float("1.0".to_string())));
    assert_eq!(layout.fields[1].default, Some(DefaultLiteral::Float("0.25".to_string())));
    assert_eq!(layout.fields[2].default, Some(DefaultLiteral::Int("-1".to_string())));
  }

  #[test]
  fn member_defaults_pack_into_the_group() {
    let layout = resolve(vec![
      FieldDef::new("isOn", PrimitiveKind::U8).with_bits(1).with_default(1.0),
      FieldDef::new("mode", PrimitiveKind::U8).with_bits(3).with_default(5.0),
      FieldDef::new("level", PrimitiveKind::U8).with_bits(4),
    ]);
    assert_eq!(layout.groups[0].default_value, 0x0B);
  }

  #[test]
  fn bool_member_defaults_pack_as_set_bits() {
    let layout = resolve(vec![
      FieldDef::new("isOn", PrimitiveKind::U8).with_bits(1).with_default(2.0),
      FieldDef::new("isLit", PrimitiveKind::U8).with_bits(1).with_default(-1.0),
      FieldDef::new("isOff", PrimitiveKind::U8).with_bits(1).with_default(0.0),
    ]);
    assert_eq!(layout.fields[0].default, Some(DefaultLiteral::Bool(true)));
    assert_eq!(layout.fields[1].default, Some(DefaultLiteral::Bool(true)));
    assert_eq!(layout.groups[0].default_value, 0x03);
  }

  #[test]
  fn zero_width_member_keeps_the_group_open() {
    let layout = resolve(vec![
      FieldDef::new("a", PrimitiveKind::U8).with_bits(1),
      FieldDef::new("gap", PrimitiveKind::U8).with_bits(0).with_default(1.0),
      FieldDef::new("b", PrimitiveKind::U8).with_bits(1).with_default(1.0),
    ]);

    assert_eq!(layout.groups.len(), 1);
    assert_eq!(layout.groups[0].members, vec![0, 1, 2]);
    assert_eq!(layout.size, 1);
    let labels: Vec<&str> = layout.fields.iter().map(|f| f.class.label()).collect();
    assert_eq!(labels, vec!["bitfield-member", "bitfield-member", "bitfield-member"]);
    match layout.fields[1].class {
      FieldClass::BitfieldMember { bit_offset, bit_width, mask, clear_mask, .. } => {
        assert_eq!((bit_offset, bit_width, mask, clear_mask), (1, 0, 0x00, 0xFF));
      }
      ref other => panic!("unexpected class {:?}", other),
    }
    assert_eq!(layout.groups[0].default_value, 0x02);
  }

  #[test]
  fn arrays_never_get_initializers() {
    let layout = resolve(vec![FieldDef::new("name", PrimitiveKind::FixStr).with_array_length(4).with_default(0.0)]);
    assert_eq!(layout.fields[0].default, None);
  }

  #[test]
  fn unknown_kinds_degrade_without_failing() {
    let layout = resolve(vec![
      FieldDef::new("mystery", PrimitiveKind::Unknown),
      FieldDef::new("hp", PrimitiveKind::S32),
    ]);

    assert_eq!(layout.fields[0].class, FieldClass::SizedScalar { size: 0 });
    assert_eq!(layout.fields[1].offset, Some(0));
  }

  #[test]
  fn duplicate_names_abort_the_schema() {
    let heuristics = BoolHeuristics::default();
    let def = Paramdef::new(
      "DUP_ST",
      vec![FieldDef::new("x", PrimitiveKind::U8), FieldDef::new("x", PrimitiveKind::U8)],
    );
    let err = LayoutResolver::new(&heuristics).resolve(&def, Some(2)).unwrap_err();
    assert_eq!(
      err,
      LayoutError::DuplicateField { param_type: "DUP_ST".to_string(), name: "x".to_string(), first: 0, second: 1 }
    );
  }
}
