/* Helper utilities shared by the C++ and Rust emitters */

use crate::paramdef::resolved::DefaultLiteral;
use crate::paramdef::types::PrimitiveKind;

/* Type name emitted for kinds with no known layout */
pub const UNKNOWN_TYPE: &str = "unknown_type";

/* Convert a primitive kind to its C++ type name */
pub fn primitive_to_cpp_type(kind: PrimitiveKind) -> &'static str {
  match kind {
    PrimitiveKind::U8 | PrimitiveKind::Dummy8 => "unsigned char",
    PrimitiveKind::S8 => "signed char",
    PrimitiveKind::U16 => "unsigned short",
    PrimitiveKind::S16 => "short",
    PrimitiveKind::U32 => "unsigned int",
    PrimitiveKind::S32 | PrimitiveKind::B32 => "int",
    PrimitiveKind::F32 | PrimitiveKind::A32 => "float",
    PrimitiveKind::F64 => "double",
    PrimitiveKind::FixStr => "char",
    PrimitiveKind::FixStrW => "wchar_t",
    PrimitiveKind::Unknown => UNKNOWN_TYPE,
  }
}

/* Convert a primitive kind to its Rust type name */
pub fn primitive_to_rust_type(kind: PrimitiveKind) -> &'static str {
  match kind {
    PrimitiveKind::U8 | PrimitiveKind::Dummy8 | PrimitiveKind::FixStr => "u8",
    PrimitiveKind::S8 => "i8",
    PrimitiveKind::U16 | PrimitiveKind::FixStrW => "u16",
    PrimitiveKind::S16 => "i16",
    PrimitiveKind::U32 => "u32",
    PrimitiveKind::S32 | PrimitiveKind::B32 => "i32",
    PrimitiveKind::F32 | PrimitiveKind::A32 => "f32",
    PrimitiveKind::F64 => "f64",
    PrimitiveKind::Unknown => UNKNOWN_TYPE,
  }
}

/* Escape Rust keywords to valid identifiers */
pub fn escape_rust_keyword(name: &str) -> String {
  const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod",
    "move", "mut", "pub", "ref", "return", "static", "struct", "trait",
    "true", "type", "unsafe", "use", "where", "while", "async", "await",
    "dyn", "abstract", "become", "box", "do", "final", "macro", "override",
    "priv", "typeof", "unsized", "virtual", "yield", "try", "gen",
  ];

  /* These cannot be raw identifiers */
  const RESERVED_PATH_KEYWORDS: &[&str] = &["self", "Self", "super", "crate"];

  if RESERVED_PATH_KEYWORDS.contains(&name) {
    format!("{}_", name)
  } else if RUST_KEYWORDS.contains(&name) {
    format!("r#{}", name)
  } else {
    name.to_string()
  }
}

/* Escape C++ keywords by appending an underscore */
pub fn escape_cpp_keyword(name: &str) -> String {
  const CPP_KEYWORDS: &[&str] = &[
    "auto", "bool", "break", "case", "catch", "char", "class", "const", "continue",
    "default", "delete", "do", "double", "else", "enum", "explicit", "extern",
    "false", "float", "for", "friend", "goto", "if", "inline", "int", "long",
    "namespace", "new", "operator", "private", "protected", "public", "register",
    "return", "short", "signed", "sizeof", "static", "struct", "switch", "template",
    "this", "throw", "true", "try", "typedef", "typename", "union", "unsigned",
    "using", "virtual", "void", "volatile", "while",
  ];

  if CPP_KEYWORDS.contains(&name) {
    format!("{}_", name)
  } else {
    name.to_string()
  }
}

/* Hex literal padded to the width of a `size`-byte storage word */
pub fn hex_literal(value: u32, size: u64) -> String {
  let digits = (size.clamp(1, 4) * 2) as usize;
  format!("0x{:0digits$X}", value, digits = digits)
}

/* Render a default value as a C++ brace initializer body */
pub fn cpp_default_literal(default: &DefaultLiteral) -> String {
  match default {
    DefaultLiteral::Bool(true) => "true".to_string(),
    DefaultLiteral::Bool(false) => "false".to_string(),
    DefaultLiteral::Float(text) => format!("{}f", text),
    DefaultLiteral::Int(text) => text.clone(),
  }
}

/* Render a default value as a Rust expression for a field stored as `kind` */
pub fn rust_default_literal(default: &DefaultLiteral, kind: PrimitiveKind) -> String {
  match default {
    /* Flags keep their integer storage in Rust */
    DefaultLiteral::Bool(value) => if *value { "1".to_string() } else { "0".to_string() },
    DefaultLiteral::Float(text) => text.clone(),
    DefaultLiteral::Int(text) if kind.is_float() => {
      if text.contains('.') { text.clone() } else { format!("{}.0", text) }
    }
    DefaultLiteral::Int(text) => text.clone(),
  }
}

/* Zero value for a Rust field stored as `kind` */
pub fn rust_zero_literal(kind: PrimitiveKind) -> &'static str {
  if kind.is_float() { "0.0" } else { "0" }
}

/* Flatten multi-line documentation into a single comment line */
pub fn single_line(text: &str) -> String {
  text.replace("\r\n", " ").replace(['\n', '\r'], " ").trim().to_string()
}
