pub mod cpp;
pub mod helpers;
pub mod rust;
pub mod shared;

use crate::paramdef::resolved::ResolvedParamdef;
use crate::paramdef::types::ParamInfo;
use std::path::PathBuf;

/* A generated file, relative to the output directory */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
  pub path: PathBuf,
  pub contents: String,
}

/* A target language backend. Emitters only format already resolved layouts. */
pub trait ParamCodeGen: Sync {
  fn file_extension(&self) -> &'static str;

  /* Struct declaration for one paramdef */
  fn gen_paramdef_code(&self, layout: &ResolvedParamdef) -> String;

  /* Named wrapper for one param table, given the layout of its paramdef */
  fn gen_param_code(&self, param: &ParamInfo, layout: &ResolvedParamdef) -> String;

  /* Files tying the generated paramdefs and params together */
  fn gen_common_files(&self, paramdef_types: &[String], param_names: &[String]) -> Vec<GeneratedFile>;

  fn paramdef_path(&self, param_type: &str) -> PathBuf {
    PathBuf::from("paramdef").join(format!("{}{}", param_type, self.file_extension()))
  }

  fn param_path(&self, param_name: &str) -> PathBuf {
    PathBuf::from("param").join(format!("{}{}", param_name, self.file_extension()))
  }
}
