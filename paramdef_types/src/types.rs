use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Bit-size value meaning "this field is not a bitfield".
pub const NOT_A_BITFIELD: i32 = -1;

/// Primitive storage kinds a paramdef field can be declared with.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum PrimitiveKind {
    #[serde(rename = "s8")]
    S8,
    #[serde(rename = "u8")]
    U8,
    #[serde(rename = "s16")]
    S16,
    #[serde(rename = "u16")]
    U16,
    #[serde(rename = "s32")]
    S32,
    #[serde(rename = "u32")]
    U32,
    #[serde(rename = "b32")]
    B32,
    #[serde(rename = "f32")]
    F32,
    #[serde(rename = "a32")]
    A32,
    #[serde(rename = "f64")]
    F64,
    #[serde(rename = "fixstr")]
    FixStr,
    #[serde(rename = "fixstrW")]
    FixStrW,
    #[serde(rename = "dummy8")]
    Dummy8,
    /// Any type tag the model does not know about.
    #[serde(rename = "unknown", other)]
    Unknown,
}

impl PrimitiveKind {
    /// Size of a single value of this kind, in bytes.
    pub fn value_size(self) -> u64 {
        match self {
            PrimitiveKind::S8 | PrimitiveKind::U8 | PrimitiveKind::FixStr | PrimitiveKind::Dummy8 => 1,
            PrimitiveKind::S16 | PrimitiveKind::U16 | PrimitiveKind::FixStrW => 2,
            PrimitiveKind::S32
            | PrimitiveKind::U32
            | PrimitiveKind::B32
            | PrimitiveKind::F32
            | PrimitiveKind::A32 => 4,
            PrimitiveKind::F64 => 8,
            PrimitiveKind::Unknown => 0,
        }
    }

    /// Whether fields of this kind may be packed into bitfields.
    pub fn is_bit_type(self) -> bool {
        matches!(
            self,
            PrimitiveKind::U8 | PrimitiveKind::U16 | PrimitiveKind::U32 | PrimitiveKind::Dummy8
        )
    }

    /// Whether the field's array length applies to this kind.
    pub fn is_array_type(self) -> bool {
        matches!(
            self,
            PrimitiveKind::FixStr | PrimitiveKind::FixStrW | PrimitiveKind::Dummy8
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, PrimitiveKind::F32 | PrimitiveKind::A32 | PrimitiveKind::F64)
    }

    /// Number of bits available to a bitfield stored in this kind.
    pub fn bit_limit(self) -> Option<u32> {
        match self {
            PrimitiveKind::U8 | PrimitiveKind::Dummy8 => Some(8),
            PrimitiveKind::U16 => Some(16),
            PrimitiveKind::U32 => Some(32),
            _ => None,
        }
    }

    /// Kind used when comparing bitfield storage; filler bytes pack like `u8`.
    pub fn storage_kind(self) -> PrimitiveKind {
        match self {
            PrimitiveKind::Dummy8 => PrimitiveKind::U8,
            other => other,
        }
    }

    /// The tag used for this kind in paramdef files.
    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveKind::S8 => "s8",
            PrimitiveKind::U8 => "u8",
            PrimitiveKind::S16 => "s16",
            PrimitiveKind::U16 => "u16",
            PrimitiveKind::S32 => "s32",
            PrimitiveKind::U32 => "u32",
            PrimitiveKind::B32 => "b32",
            PrimitiveKind::F32 => "f32",
            PrimitiveKind::A32 => "a32",
            PrimitiveKind::F64 => "f64",
            PrimitiveKind::FixStr => "fixstr",
            PrimitiveKind::FixStrW => "fixstrW",
            PrimitiveKind::Dummy8 => "dummy8",
            PrimitiveKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_bit_size() -> i32 {
    NOT_A_BITFIELD
}

fn default_array_length() -> i32 {
    1
}

/// A single field descriptor of a paramdef.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct FieldDef {
    pub internal_name: String,
    pub display_type: PrimitiveKind,
    /// Type tag from the schema (e.g. `ON_OFF`, `dummy8`).
    #[serde(default)]
    pub internal_type: String,
    #[serde(default = "default_bit_size")]
    pub bit_size: i32,
    #[serde(default = "default_array_length")]
    pub array_length: i32,
    #[serde(default)]
    pub default: Option<f64>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl FieldDef {
    /// Creates a plain scalar field with no bit-size, docs or default.
    pub fn new(internal_name: impl Into<String>, display_type: PrimitiveKind) -> Self {
        Self {
            internal_name: internal_name.into(),
            display_type,
            internal_type: display_type.as_str().to_string(),
            bit_size: NOT_A_BITFIELD,
            array_length: 1,
            default: None,
            display_name: None,
            description: None,
        }
    }

    pub fn with_bits(mut self, bit_size: i32) -> Self {
        self.bit_size = bit_size;
        self
    }

    pub fn with_array_length(mut self, array_length: i32) -> Self {
        self.array_length = array_length;
        self
    }

    pub fn with_default(mut self, default: f64) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_internal_type(mut self, internal_type: impl Into<String>) -> Self {
        self.internal_type = internal_type.into();
        self
    }

    pub fn with_docs(mut self, display_name: impl Into<String>, description: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self.description = Some(description.into());
        self
    }

    pub fn is_bitfield(&self) -> bool {
        self.bit_size != NOT_A_BITFIELD
    }
}

/// An ordered field layout for one binary record kind.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Paramdef {
    pub param_type: String,
    #[serde(default)]
    pub data_version: i32,
    #[serde(default)]
    pub big_endian: bool,
    #[serde(default)]
    pub unicode: bool,
    #[serde(default)]
    pub format_version: i32,
    pub fields: Vec<FieldDef>,
}

impl Paramdef {
    pub fn new(param_type: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            param_type: param_type.into(),
            data_version: 0,
            big_endian: false,
            unicode: true,
            format_version: 0,
            fields,
        }
    }
}
