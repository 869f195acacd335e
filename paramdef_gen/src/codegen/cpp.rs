use crate::codegen::helpers::{cpp_default_literal, escape_cpp_keyword, primitive_to_cpp_type, single_line};
use crate::codegen::{GeneratedFile, ParamCodeGen};
use crate::paramdef::resolved::{FieldClass, Presentation, ResolvedField, ResolvedParamdef};
use crate::paramdef::types::ParamInfo;
use std::path::PathBuf;

pub struct CppCodeGenerator {
  options: CppCodeGeneratorOptions,
}

pub struct CppCodeGeneratorOptions {
  pub write_comments: bool,
  /* Include prefix used by the common headers */
  pub include_root: String,
}

impl Default for CppCodeGeneratorOptions {
  fn default() -> Self {
    Self { write_comments: false, include_root: "param".to_string() }
  }
}

impl CppCodeGenerator {
  pub fn new(options: CppCodeGeneratorOptions) -> Self {
    Self { options }
  }

  /* Fields named as padding or unknowns never get a doc block */
  fn is_placeholder_name(name: &str) -> bool {
    name.starts_with("unk") || name.starts_with("pad") || name.starts_with("reserve") || name.starts_with("Reserve")
  }

  fn emit_field_docs(&self, field: &ResolvedField, output: &mut String) {
    let display_name = field.display_name.as_deref().unwrap_or("");
    let description = field.description.as_deref().unwrap_or("");
    if (display_name.is_empty() && description.is_empty()) || Self::is_placeholder_name(&field.name) {
      return;
    }

    output.push_str("\t/**\n");
    if !display_name.is_empty() {
      output.push_str(&format!("\t * @brief {}\n", single_line(display_name)));
    }
    if !description.is_empty() && description != display_name {
      output.push_str("\t *\n");
      for line in description.lines() {
        output.push_str(&format!("\t * {}\n", line.trim_end()));
      }
    }
    output.push_str("\t */\n");
  }

  fn emit_field(&self, field: &ResolvedField, output: &mut String) {
    let type_name = match field.presentation {
      Presentation::Bool => "bool",
      Presentation::Native => primitive_to_cpp_type(field.kind),
    };
    let mut decl = format!("{} {}", type_name, escape_cpp_keyword(&field.name));

    match &field.class {
      FieldClass::BitfieldMember { bit_width, .. } => decl.push_str(&format!(": {}", bit_width)),
      FieldClass::SizedArray { length, .. } => decl.push_str(&format!("[{}]", length)),
      FieldClass::ZeroSize { .. } if field.bit_size >= 0 => decl.push_str(&format!(": {}", field.bit_size)),
      FieldClass::ZeroSize { .. } if field.kind.is_array_type() => decl.push_str(&format!("[{}]", field.array_length)),
      FieldClass::ZeroSize { .. } | FieldClass::SizedScalar { .. } => {}
    }

    if let Some(default) = &field.default {
      decl.push_str(&format!(" {{ {} }}", cpp_default_literal(default)));
    }

    /* Zero-size fields and zero-width members stay as documentation only */
    let placeholder = matches!(field.class, FieldClass::BitfieldMember { bit_width: 0, .. });
    if field.class.is_zero_size() || placeholder {
      output.push_str("\t// ");
    } else {
      output.push('\t');
    }
    output.push_str(&decl);
    output.push_str(";\n\n");
  }

  fn size_assert(type_expr: &str, display_name: &str, size: u64) -> String {
    format!(
      "static_assert(sizeof({}) == {}, \"{} paramdef size does not match detected size\");\n",
      type_expr, size, display_name
    )
  }
}

impl ParamCodeGen for CppCodeGenerator {
  fn file_extension(&self) -> &'static str {
    ".hpp"
  }

  fn gen_paramdef_code(&self, layout: &ResolvedParamdef) -> String {
    let mut output = String::new();

    output.push_str("/* This file was automatically generated from paramdef schemas. */\n");
    output.push_str("#pragma once\n\n");

    if self.options.write_comments {
      output.push_str(&format!("// Data Version: {}\n", layout.data_version));
      output.push_str(&format!("// Is Big Endian: {}\n", if layout.big_endian { "True" } else { "False" }));
      output.push_str(&format!("// Is Unicode: {}\n", if layout.unicode { "True" } else { "False" }));
      output.push_str(&format!("// Format Version: {}\n\n", layout.format_version));
    }

    output.push_str("namespace from {\n");
    output.push_str("namespace paramdef {\n\n");
    output.push_str(&format!("struct {} {{\n", layout.param_type));

    for field in &layout.fields {
      if self.options.write_comments {
        self.emit_field_docs(field, &mut output);
      }
      self.emit_field(field, &mut output);
    }

    output.push_str("};\n\n");
    output.push_str("}; // namespace paramdef\n");
    output.push_str("}; // namespace from\n");

    if let Some(size) = layout.detected_size {
      output.push('\n');
      output.push_str(&Self::size_assert(
        &format!("from::paramdef::{}", layout.param_type),
        &layout.param_type,
        size,
      ));
    }

    output
  }

  fn gen_param_code(&self, param: &ParamInfo, layout: &ResolvedParamdef) -> String {
    let mut output = String::new();

    output.push_str("/* This file was automatically generated from regulation data. */\n");
    output.push_str("#pragma once\n");
    output.push_str(&format!("#include <{}/paramdef/{}.hpp>\n\n", self.options.include_root, layout.param_type));

    if self.options.write_comments {
      output.push_str(&format!("// Type: {}\n", param.param_type));
    }
    output.push_str(&format!("struct {} : from::paramdef::{} {{\n", param.name, param.param_type));
    output.push_str(&format!("\tstatic constexpr const char* param_type = \"{}\";\n", param.param_type));
    output.push_str(&format!("\tstatic constexpr const char* param_name = \"{}\";\n", param.name));
    output.push_str(&format!("\tstatic constexpr const wchar_t* param_namew = L\"{}\";\n", param.name));
    output.push_str("};\n");

    if let Some(size) = param.detected_size() {
      output.push('\n');
      output.push_str(&Self::size_assert(&param.name, &param.name, size));
    }

    output
  }

  fn gen_common_files(&self, paramdef_types: &[String], param_names: &[String]) -> Vec<GeneratedFile> {
    let mut files = Vec::new();
    let root = &self.options.include_root;

    let mut paramdefs = String::from("#pragma once\n\n");
    for name in paramdef_types {
      paramdefs.push_str(&format!("#include <{}/paramdef/{}.hpp>\n", root, name));
    }
    files.push(GeneratedFile { path: PathBuf::from("detail").join("paramdef.hpp"), contents: paramdefs });

    if !param_names.is_empty() {
      let mut params = String::from("#pragma once\n\n");
      for name in param_names {
        params.push_str(&format!("#include <{}/param/{}.hpp>\n", root, name));
      }
      files.push(GeneratedFile { path: PathBuf::from("detail").join("param.hpp"), contents: params });
    }

    files
  }
}
