use paramdef_gen::cmds::analyze::{self, AnalyzeOptions, IrOutputFormat};
use paramdef_gen::cmds::codegen::{self, CodegenOptions, Language};
use paramdef_gen::cmds::common::resolve_paramdef;
use paramdef_gen::codegen::shared::ir::{FieldLayoutIr, LayoutIr, ParamdefIr};
use paramdef_gen::codegen::shared::serialization::layout_ir_to_json;
use paramdef_gen::config::{Overrides, Settings};
use paramdef_gen::paramdef::file::SchemaSet;
use paramdef_gen::paramdef::resolved::FieldClass;
use paramdef_gen::paramdef::unique::UniqueNameMethod;
use std::path::{Path, PathBuf};
use std::process::Command;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn codegen_options(language: Language, output_dir: &Path) -> CodegenOptions {
    CodegenOptions {
        defs_dir: fixtures().join("defs"),
        params: Some(fixtures().join("params.yaml")),
        language,
        output_dir: output_dir.to_path_buf(),
        config: None,
        overrides: Overrides::default(),
        verbose: false,
    }
}

#[test]
fn test_fixture_layouts_resolve() {
    let schemas = SchemaSet::load(&fixtures().join("defs"), Some(&fixtures().join("params.yaml"))).unwrap();
    assert_eq!(schemas.len(), 2);

    let loaded = &schemas.paramdefs["SAMPLE_FLAGS_PARAM_ST"];
    let layout = resolve_paramdef(
        &loaded.def,
        &Settings::default(),
        schemas.detected_size("SAMPLE_FLAGS_PARAM_ST"),
    )
    .unwrap();

    assert_eq!(layout.size, 28);
    assert_eq!(layout.detected_size, Some(28));
    assert_eq!(layout.groups.len(), 2);
    assert_eq!(layout.groups[0].name, "Bitfield1");
    assert_eq!(layout.groups[0].offset, 8);
    assert_eq!(layout.groups[1].offset, 10);
    assert_eq!(layout.field("unkFlags_0").and_then(|f| f.offset), Some(10));
    assert_eq!(layout.field("name").and_then(|f| f.offset), Some(12));
    assert!(layout.field("reserved").map(|f| f.class.is_zero_size()).unwrap_or(false));

    match layout.field("mode").map(|f| &f.class) {
        Some(FieldClass::BitfieldMember { mask, bit_offset, .. }) => {
            assert_eq!(*mask, 0x0E);
            assert_eq!(*bit_offset, 1);
        }
        other => panic!("unexpected class {:?}", other),
    }
}

#[test]
fn test_codegen_writes_rust_tree() {
    let temp = tempfile::tempdir().unwrap();
    codegen::run(codegen_options(Language::Rust, temp.path())).unwrap();

    for path in [
        "mod.rs",
        "paramdef/mod.rs",
        "paramdef/SAMPLE_FLAGS_PARAM_ST.rs",
        "paramdef/MENU_TEST_PARAM_ST.rs",
        "param/mod.rs",
        "param/traits.rs",
        "param/SampleFlagsParam.rs",
        "param/MenuTestParam.rs",
    ] {
        assert!(temp.path().join(path).is_file(), "missing {}", path);
    }
    assert!(!temp.path().join("param/OrphanParam.rs").exists());

    let param_mod = std::fs::read_to_string(temp.path().join("param/mod.rs")).unwrap();
    assert!(param_mod.contains("pub mod traits;\npub mod MenuTestParam;\npub mod SampleFlagsParam;\n"));
}

#[test]
fn test_codegen_writes_cpp_tree() {
    let temp = tempfile::tempdir().unwrap();
    codegen::run(codegen_options(Language::Cpp, temp.path())).unwrap();

    let header = std::fs::read_to_string(temp.path().join("paramdef/SAMPLE_FLAGS_PARAM_ST.hpp")).unwrap();
    assert!(header.contains("\tunsigned short unkFlags_0: 9;\n"));
    assert!(header.contains("\tunsigned short unkFlags_1: 7;\n"));
    assert!(header.contains("\t// unsigned char reserved[0];\n"));
    assert!(header.contains("static_assert(sizeof(from::paramdef::SAMPLE_FLAGS_PARAM_ST) == 28,"));

    let menu = std::fs::read_to_string(temp.path().join("paramdef/MENU_TEST_PARAM_ST.hpp")).unwrap();
    assert!(!menu.contains("static_assert"));
    assert!(menu.contains("\tbool disableParam_NT: 1;\n"));
    assert!(menu.contains("\t// short unused: 4;\n"));

    assert!(temp.path().join("detail/paramdef.hpp").is_file());
    assert!(temp.path().join("detail/param.hpp").is_file());
}

#[test]
fn test_config_file_and_overrides() {
    let temp = tempfile::tempdir().unwrap();
    let mut options = codegen_options(Language::Cpp, temp.path());
    options.config = Some(fixtures().join("config.yaml"));
    codegen::run(options).unwrap();

    /* counter-number-all with d2 numbering, comments on, and only ^disable is boolean */
    let header = std::fs::read_to_string(temp.path().join("paramdef/SAMPLE_FLAGS_PARAM_ST.hpp")).unwrap();
    assert!(header.contains("iconId_00"));
    assert!(header.contains("unkFlags_01: 7;"));
    assert!(header.contains("// Data Version: 2\n"));
    assert!(header.contains("@brief Icon ID"));
    assert!(header.contains("\tunsigned char isDisable_00: 1 { 0 };\n"));

    let menu = std::fs::read_to_string(temp.path().join("paramdef/MENU_TEST_PARAM_ST.hpp")).unwrap();
    assert!(menu.contains("\tbool disableParam_NT_00: 1;\n"));
    assert!(menu.contains("\tunsigned char isVisible_00 { 1 };\n"));

    let temp = tempfile::tempdir().unwrap();
    let mut options = codegen_options(Language::Cpp, temp.path());
    options.config = Some(fixtures().join("config.yaml"));
    options.overrides = Overrides {
        unique_names: Some(UniqueNameMethod::None),
        number_format: None,
        write_comments: Some(false),
    };
    let err = codegen::run(options).unwrap_err();
    assert!(err.to_string().contains("SAMPLE_FLAGS_PARAM_ST"));

    /* The schema without collisions is still generated */
    let menu = std::fs::read_to_string(temp.path().join("paramdef/MENU_TEST_PARAM_ST.hpp")).unwrap();
    assert!(menu.contains("\tbool disableParam_NT: 1;\n"));
    assert!(!menu.contains("// Data Version"));
    assert!(!temp.path().join("paramdef/SAMPLE_FLAGS_PARAM_ST.hpp").exists());
}

#[test]
fn test_offset_naming() {
    let schemas = SchemaSet::load(&fixtures().join("defs"), None).unwrap();
    let settings = Settings::build(
        None,
        Overrides {
            unique_names: Some(UniqueNameMethod::Offset),
            number_format: None,
            write_comments: None,
        },
    )
    .unwrap();
    let layout = resolve_paramdef(&schemas.paramdefs["SAMPLE_FLAGS_PARAM_ST"].def, &settings, None).unwrap();

    let names: Vec<&str> = layout.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "iconId_000",
            "effectRate_004",
            "isDisable_008",
            "mode_008",
            "level_008",
            "reserved_009",
            "pad_009",
            "unkFlags_00A",
            "unkFlags_00B",
            "name_00C",
        ]
    );
}

#[test]
fn test_layout_ir_for_fixtures() {
    let schemas = SchemaSet::load(&fixtures().join("defs"), None).unwrap();
    let settings = Settings::default();
    let layouts: Vec<ParamdefIr> = schemas
        .paramdefs
        .values()
        .map(|loaded| ParamdefIr::from(&resolve_paramdef(&loaded.def, &settings, None).unwrap()))
        .collect();
    let ir = LayoutIr::new(layouts);

    let menu = &ir.paramdefs[0];
    assert_eq!(menu.param_type, "MENU_TEST_PARAM_ST");
    assert_eq!(
        menu.fields[5].layout,
        FieldLayoutIr::ZeroSize {
            reason: "non-packable-bits".to_string()
        }
    );

    let json = layout_ir_to_json(&ir).unwrap();
    assert!(json.contains("\"name\": \"Bitfield2\""));
}

#[test]
fn test_analyze_runs_on_fixtures() {
    analyze::run(AnalyzeOptions {
        defs_dir: fixtures().join("defs"),
        params: Some(fixtures().join("params.yaml")),
        config: None,
        overrides: Overrides::default(),
        print_ir: true,
        ir_format: IrOutputFormat::Protobuf,
        verbose: false,
    })
    .unwrap();
}

#[test]
fn test_missing_defs_dir_fails() {
    let temp = tempfile::tempdir().unwrap();
    let mut options = codegen_options(Language::Rust, temp.path());
    options.defs_dir = temp.path().join("nope");
    let err = codegen::run(options).unwrap_err();
    assert!(format!("{:#}", err).contains("is not a directory"));
}

#[test]
fn test_cli_codegen() {
    let temp = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_paramdef-gen"))
        .arg("codegen")
        .arg("-d")
        .arg(fixtures().join("defs"))
        .arg("-p")
        .arg(fixtures().join("params.yaml"))
        .arg("-l")
        .arg("rust")
        .arg("-o")
        .arg(temp.path())
        .arg("-u")
        .arg("counter-number-all")
        .arg("--comments")
        .arg("-v")
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[✓] SAMPLE_FLAGS_PARAM_ST"));

    let code = std::fs::read_to_string(temp.path().join("paramdef/SAMPLE_FLAGS_PARAM_ST.rs")).unwrap();
    assert!(code.contains("pub fn get_mode_00(&self) -> u8"));
    assert!(code.contains("/// Format Version: 203\n"));
}
