/* Analyze command - report resolved layouts without generating code */

use super::common::{load_schemas, load_settings, resolve_all};
use crate::codegen::helpers::hex_literal;
use crate::codegen::shared::ir::{LayoutIr, ParamdefIr};
use crate::codegen::shared::serialization::{layout_ir_to_json, layout_ir_to_protobuf};
use crate::config::Overrides;
use crate::paramdef::resolved::{FieldClass, Presentation, ResolvedParamdef};
use clap::ValueEnum;
use std::path::PathBuf;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum IrOutputFormat {
    Json,
    Protobuf,
}

pub struct AnalyzeOptions {
    pub defs_dir: PathBuf,
    pub params: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub overrides: Overrides,
    pub print_ir: bool,
    pub ir_format: IrOutputFormat,
    pub verbose: bool,
}

/* Execute the analyze command */
pub fn run(options: AnalyzeOptions) -> anyhow::Result<()> {
    println!("Paramdef Generator - Layout Analysis Tool");
    println!("=========================================\n");

    let settings = load_settings(options.config.as_deref(), options.overrides, options.verbose)?;
    let schemas = load_schemas(&options.defs_dir, options.params.as_deref(), true)?;

    let mut layouts = Vec::new();
    let mut failures = Vec::new();
    for result in resolve_all(&schemas, &settings) {
        match result.layout {
            Ok(layout) => layouts.push(layout),
            Err(e) => {
                println!("[✗] {}: {}", result.param_type, e);
                failures.push(result.param_type);
            }
        }
    }

    for layout in &layouts {
        print_layout(layout);
    }

    if options.print_ir {
        let layout_ir = LayoutIr::new(layouts.iter().map(ParamdefIr::from).collect());
        print_layout_ir(&layout_ir, options.ir_format)?;
    }

    if !failures.is_empty() {
        anyhow::bail!("{} paramdef(s) failed to resolve: {}", failures.len(), failures.join(", "));
    }

    Ok(())
}

fn print_layout(layout: &ResolvedParamdef) {
    println!(
        "[~] {} ({} field(s), {} bitfield group(s))",
        layout.param_type,
        layout.fields.len(),
        layout.groups.len()
    );
    println!("    {:>6}  {:<16} {:<8} {:<5} name", "offset", "class", "kind", "bool");

    for field in &layout.fields {
        let offset = field.offset.map(|o| o.to_string()).unwrap_or_else(|| "-".to_string());
        let detail = match &field.class {
            FieldClass::BitfieldMember { group, bit_offset, bit_width, mask, .. } => {
                let size = layout.group(*group).map(|g| g.storage.value_size()).unwrap_or(4);
                format!(
                    "  [Bitfield{} bits {}..{} mask {}]",
                    group,
                    bit_offset,
                    bit_offset + bit_width,
                    hex_literal(*mask, size)
                )
            }
            FieldClass::SizedArray { length, element_size } => format!("  [{} x {}]", length, element_size),
            FieldClass::ZeroSize { reason } => format!("  [{:?}]", reason),
            FieldClass::SizedScalar { .. } => String::new(),
        };
        println!(
            "    {:>6}  {:<16} {:<8} {:<5} {}{}",
            offset,
            field.class.label(),
            field.kind.as_str(),
            if field.presentation == Presentation::Bool { "yes" } else { "" },
            field.name,
            detail
        );
    }

    match layout.detected_size {
        Some(detected) if detected == layout.size => {
            println!("[✓] Computed size {} matches detected size", layout.size);
        }
        Some(detected) => {
            println!("[✗] Computed size {} differs from detected size {}", layout.size, detected);
        }
        None => println!("[~] Computed size {} (no detected size)", layout.size),
    }
    println!();
}

fn print_layout_ir(layout_ir: &LayoutIr, format: IrOutputFormat) -> anyhow::Result<()> {
    match format {
        IrOutputFormat::Json => {
            println!("\n[~] Layout IR (JSON)");
            println!("====================");
            let json = layout_ir_to_json(layout_ir)?;
            println!("{}", json);
            println!();
        }
        IrOutputFormat::Protobuf => {
            println!("\n[~] Layout IR (Protobuf)");
            println!("========================");
            println!("(hex-encoded bytes, IR schema v{})", layout_ir.version);
            let bytes = layout_ir_to_protobuf(layout_ir)?;
            println!("{}", hex_encode(&bytes));
            println!();
        }
    }

    Ok(())
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
