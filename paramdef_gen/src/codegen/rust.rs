use crate::codegen::helpers::{
  escape_rust_keyword, hex_literal, primitive_to_rust_type, rust_default_literal, rust_zero_literal, single_line,
};
use crate::codegen::{GeneratedFile, ParamCodeGen};
use crate::paramdef::resolved::{BitfieldGroup, FieldClass, ResolvedField, ResolvedParamdef};
use crate::paramdef::types::ParamInfo;
use std::path::PathBuf;

pub struct RustCodeGenerator {
  options: RustCodeGeneratorOptions,
}

pub struct RustCodeGeneratorOptions {
  pub write_comments: bool,
  /* Emit a `#[cfg(test)]` size check into every param module */
  pub emit_size_tests: bool,
}

impl Default for RustCodeGeneratorOptions {
  fn default() -> Self {
    Self { write_comments: false, emit_size_tests: true }
  }
}

const TRAITS_MODULE: &str = r#"pub trait ParamType {
    const NAME: &'static str;
    const VERSION: u16;

    fn param_type_name(&self) -> &'static str {
        Self::NAME
    }

    fn version(&self) -> u16 {
        Self::VERSION
    }
}

pub trait Param {
    const NAME: &'static str;
    const VERSION: u16;
    type ParamType: ParamType;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn version(&self) -> u16 {
        Self::VERSION
    }

    fn param_type_name(&self) -> &'static str {
        <Self::ParamType as ParamType>::NAME
    }
}
"#;

impl RustCodeGenerator {
  pub fn new(options: RustCodeGeneratorOptions) -> Self {
    Self { options }
  }

  fn emit_docs(&self, field: &ResolvedField, indent: &str, output: &mut String) {
    if !self.options.write_comments {
      return;
    }
    let display_name = field.display_name.as_deref().unwrap_or("");
    let description = field.description.as_deref().unwrap_or("");
    if !display_name.is_empty() {
      output.push_str(&format!("{}/// {}\n", indent, single_line(display_name)));
    }
    if !description.is_empty() && description != display_name {
      if !display_name.is_empty() {
        output.push_str(&format!("{}///\n", indent));
      }
      for line in description.lines() {
        output.push_str(&format!("{}/// {}\n", indent, line.trim_end()));
      }
    }
  }

  fn emit_field(&self, layout: &ResolvedParamdef, field: &ResolvedField, output: &mut String) {
    let rust_type = primitive_to_rust_type(field.kind);
    let name = escape_rust_keyword(&field.name);

    match &field.class {
      FieldClass::BitfieldMember { .. } => {
        /* Only the opening member carries the storage word */
        if let Some(group) = layout.group_opened_by(field.index) {
          output.push_str(&format!("    pub {}: {},\n", group.name, primitive_to_rust_type(group.storage)));
        }
      }
      FieldClass::SizedArray { length, .. } => {
        self.emit_docs(field, "    ", output);
        output.push_str(&format!("    pub {}: [{}; {}],\n", name, rust_type, length));
      }
      FieldClass::SizedScalar { .. } => {
        self.emit_docs(field, "    ", output);
        output.push_str(&format!("    pub {}: {},\n", name, rust_type));
      }
      FieldClass::ZeroSize { .. } => {
        if field.kind.is_array_type() && field.bit_size < 0 {
          output.push_str(&format!("    // pub {}: [{}; {}],\n", name, rust_type, field.array_length));
        } else {
          output.push_str(&format!("    // pub {}: {},\n", name, rust_type));
        }
      }
    }
  }

  fn emit_accessors(&self, layout: &ResolvedParamdef, field: &ResolvedField, output: &mut String) {
    let FieldClass::BitfieldMember { group, bit_offset, bit_width, mask, clear_mask } = field.class else {
      return;
    };
    if bit_width == 0 {
      return;
    }
    let Some(group) = layout.group(group) else {
      return;
    };

    let size = group.storage.value_size();
    let storage = &group.name;
    let mask = hex_literal(mask, size);
    let clear_mask = hex_literal(clear_mask, size);

    self.emit_docs(field, "    ", output);
    if bit_width == 1 {
      output.push_str(&format!("    pub fn get_{}(&self) -> bool {{\n", field.name));
      output.push_str(&format!("        (self.{} & {}) != 0\n", storage, mask));
      output.push_str("    }\n\n");
      output.push_str(&format!("    pub fn set_{}(&mut self, state: bool) {{\n", field.name));
      output.push_str("        if state {\n");
      output.push_str(&format!("            self.{} |= {};\n", storage, mask));
      output.push_str("        } else {\n");
      output.push_str(&format!("            self.{} &= {};\n", storage, clear_mask));
      output.push_str("        }\n");
      output.push_str("    }\n\n");
      return;
    }

    let value_type = primitive_to_rust_type(group.storage);
    output.push_str(&format!("    pub fn get_{}(&self) -> {} {{\n", field.name, value_type));
    output.push_str(&format!("        (self.{} & {}) >> {}\n", storage, mask, bit_offset));
    output.push_str("    }\n\n");
    output.push_str(&format!("    pub fn set_{}(&mut self, value: {}) {{\n", field.name, value_type));
    output.push_str(&format!("        self.{} &= {};\n", storage, clear_mask));
    output.push_str("        if value != 0 {\n");
    output.push_str(&format!("            self.{} |= (value << {}) & {};\n", storage, bit_offset, mask));
    output.push_str("        }\n");
    output.push_str("    }\n\n");
  }

  fn emit_default_impl(&self, layout: &ResolvedParamdef, output: &mut String) {
    output.push_str(&format!("impl Default for {} {{\n", layout.param_type));
    output.push_str("    fn default() -> Self {\n");
    output.push_str("        Self {\n");

    for field in &layout.fields {
      let name = escape_rust_keyword(&field.name);
      match &field.class {
        FieldClass::BitfieldMember { .. } => {
          if let Some(group) = layout.group_opened_by(field.index) {
            output.push_str(&format!("            {}: {},\n", group.name, group_default(group)));
          }
        }
        FieldClass::SizedArray { length, .. } => {
          output.push_str(&format!("            {}: [{}; {}],\n", name, rust_zero_literal(field.kind), length));
        }
        FieldClass::SizedScalar { .. } => {
          let value = match &field.default {
            Some(default) => rust_default_literal(default, field.kind),
            None => rust_zero_literal(field.kind).to_string(),
          };
          output.push_str(&format!("            {}: {},\n", name, value));
        }
        FieldClass::ZeroSize { .. } => {}
      }
    }

    output.push_str("        }\n");
    output.push_str("    }\n");
    output.push_str("}\n");
  }
}

fn group_default(group: &BitfieldGroup) -> String {
  hex_literal(group.default_value, group.storage.value_size())
}

impl ParamCodeGen for RustCodeGenerator {
  fn file_extension(&self) -> &'static str {
    ".rs"
  }

  fn gen_paramdef_code(&self, layout: &ResolvedParamdef) -> String {
    let mut output = String::new();

    output.push_str("/* This file was automatically generated from paramdef schemas. */\n");
    output.push_str("use super::super::param::traits::ParamType;\n\n");

    if self.options.write_comments {
      output.push_str(&format!("/// Data Version: {}\n", layout.data_version));
      output.push_str(&format!("/// Is Big Endian: {}\n", if layout.big_endian { "True" } else { "False" }));
      output.push_str(&format!("/// Is Unicode: {}\n", if layout.unicode { "True" } else { "False" }));
      output.push_str(&format!("/// Format Version: {}\n", layout.format_version));
    }
    output.push_str("#[allow(non_camel_case_types, non_snake_case)]\n");
    output.push_str("#[derive(Debug, Clone, Copy, PartialEq)]\n");
    output.push_str("#[repr(C)]\n");
    output.push_str(&format!("pub struct {} {{\n", layout.param_type));
    for field in &layout.fields {
      self.emit_field(layout, field, &mut output);
    }
    output.push_str("}\n\n");

    if !layout.groups.is_empty() {
      output.push_str("#[allow(non_snake_case)]\n");
      output.push_str(&format!("impl {} {{\n", layout.param_type));
      let mut accessors = String::new();
      for field in &layout.fields {
        self.emit_accessors(layout, field, &mut accessors);
      }
      output.push_str(accessors.trim_end());
      output.push_str("\n}\n\n");
    }

    self.emit_default_impl(layout, &mut output);
    output.push('\n');

    /* Out of range versions degrade to 0 */
    let version = u16::try_from(layout.data_version).unwrap_or(0);
    output.push_str(&format!("impl ParamType for {} {{\n", layout.param_type));
    output.push_str(&format!("    const NAME: &'static str = \"{}\";\n", layout.param_type));
    output.push_str(&format!("    const VERSION: u16 = {};\n", version));
    output.push_str("}\n");

    if let Some(size) = layout.detected_size {
      output.push('\n');
      output.push_str(&format!(
        "const _: () = assert!(core::mem::size_of::<{}>() == {}, \"{} paramdef size does not match detected size\");\n",
        layout.param_type, size, layout.param_type
      ));
    }

    output
  }

  fn gen_param_code(&self, param: &ParamInfo, layout: &ResolvedParamdef) -> String {
    let mut output = String::new();
    let name = &param.name;
    let param_type = &layout.param_type;

    output.push_str("/* This file was automatically generated from regulation data. */\n");
    output.push_str("use super::traits::Param;\n");
    output.push_str(&format!("use super::super::paramdef::{}::{};\n\n", param_type, param_type));

    if self.options.write_comments {
      output.push_str(&format!("/// Type: {}\n", param.param_type));
    }
    output.push_str("#[derive(Debug, Clone, Copy, PartialEq, Default)]\n");
    output.push_str("#[repr(transparent)]\n");
    output.push_str(&format!("pub struct {}(pub {});\n\n", name, param_type));

    output.push_str(&format!("impl Param for {} {{\n", name));
    output.push_str(&format!("    const NAME: &'static str = \"{}\";\n", name));
    output.push_str(&format!("    const VERSION: u16 = {};\n", param.data_version_or(layout.data_version)));
    output.push_str(&format!("    type ParamType = {};\n", param_type));
    output.push_str("}\n\n");

    output.push_str(&format!("impl core::ops::Deref for {} {{\n", name));
    output.push_str(&format!("    type Target = {};\n\n", param_type));
    output.push_str(&format!("    fn deref(&self) -> &{} {{\n", param_type));
    output.push_str("        &self.0\n");
    output.push_str("    }\n");
    output.push_str("}\n\n");

    output.push_str(&format!("impl core::ops::DerefMut for {} {{\n", name));
    output.push_str(&format!("    fn deref_mut(&mut self) -> &mut {} {{\n", param_type));
    output.push_str("        &mut self.0\n");
    output.push_str("    }\n");
    output.push_str("}\n");

    if let (true, Some(size)) = (self.options.emit_size_tests, param.detected_size()) {
      output.push_str("\n#[cfg(test)]\n");
      output.push_str("mod tests {\n");
      output.push_str("    #[test]\n");
      output.push_str("    fn size_check() {\n");
      output.push_str(&format!("        assert_eq!(core::mem::size_of::<super::{}>(), {});\n", name, size));
      output.push_str("    }\n");
      output.push_str("}\n");
    }

    output
  }

  fn gen_common_files(&self, paramdef_types: &[String], param_names: &[String]) -> Vec<GeneratedFile> {
    let header = "/* This file was automatically generated. */\n";

    let mut paramdef_mod = format!("{}#![allow(non_snake_case)]\n\n", header);
    for name in paramdef_types {
      paramdef_mod.push_str(&format!("pub mod {};\n", name));
    }

    let mut param_mod = format!("{}#![allow(non_snake_case)]\n\npub mod traits;\n", header);
    for name in param_names {
      param_mod.push_str(&format!("pub mod {};\n", name));
    }

    vec![
      GeneratedFile { path: PathBuf::from("mod.rs"), contents: format!("{}pub mod param;\npub mod paramdef;\n", header) },
      GeneratedFile { path: PathBuf::from("paramdef").join("mod.rs"), contents: paramdef_mod },
      GeneratedFile { path: PathBuf::from("param").join("mod.rs"), contents: param_mod },
      GeneratedFile { path: PathBuf::from("param").join("traits.rs"), contents: format!("{}{}", header, TRAITS_MODULE) },
    ]
  }
}
