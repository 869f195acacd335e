use clap::{Parser, Subcommand, ValueEnum};
use paramdef_gen::cmds;
use paramdef_gen::cmds::analyze::IrOutputFormat;
use paramdef_gen::config::Overrides;
use paramdef_gen::paramdef::unique::UniqueNameMethod;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "paramdef-gen")]
#[command(about = "Generate C++ and Rust layouts from paramdef schemas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /* Generate code from paramdef schemas */
    Codegen {
        /* Directory containing paramdef files */
        #[arg(short = 'd', long = "defs", value_name = "DIR")]
        defs_dir: PathBuf,

        /* Param manifest listing named params and detected sizes */
        #[arg(short = 'p', long = "params", value_name = "FILE")]
        params: Option<PathBuf>,

        /* Target language for code generation */
        #[arg(short = 'l', long = "language", value_enum)]
        language: Language,

        /* Output directory for generated code */
        #[arg(short = 'o', long = "output", value_name = "DIR", default_value = "generated")]
        output_dir: PathBuf,

        #[command(flatten)]
        naming: NamingArgs,

        /* Emit field documentation and paramdef metadata comments */
        #[arg(long = "comments")]
        comments: bool,

        /* Generator config file (YAML) */
        #[arg(short = 'c', long = "config", value_name = "FILE")]
        config: Option<PathBuf>,

        /* Enable verbose output */
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },

    /* Resolve paramdef layouts and print them */
    Analyze {
        /* Directory containing paramdef files */
        #[arg(short = 'd', long = "defs", value_name = "DIR")]
        defs_dir: PathBuf,

        /* Param manifest listing named params and detected sizes */
        #[arg(short = 'p', long = "params", value_name = "FILE")]
        params: Option<PathBuf>,

        /* Print the layout IR after analysis */
        #[arg(long = "print-ir")]
        print_ir: bool,

        /* Format to use when printing the layout IR */
        #[arg(long = "ir-format", value_enum, default_value = "json")]
        ir_format: IrOutputFormat,

        #[command(flatten)]
        naming: NamingArgs,

        /* Generator config file (YAML) */
        #[arg(short = 'c', long = "config", value_name = "FILE")]
        config: Option<PathBuf>,

        /* Enable verbose output */
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },
}

#[derive(clap::Args)]
struct NamingArgs {
    /* How duplicate field names are made unique */
    #[arg(short = 'u', long = "unique-names", value_enum)]
    unique_names: Option<UniqueNames>,

    /* Suffix number format, e.g. d2, x3 or X3 */
    #[arg(long = "number-format", value_name = "FMT")]
    number_format: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum Language {
    /* Generate C++ headers (.hpp files) */
    Cpp,
    /* Generate Rust modules (.rs files) */
    Rust,
}

impl From<Language> for cmds::codegen::Language {
    fn from(lang: Language) -> Self {
        match lang {
            Language::Cpp => cmds::codegen::Language::Cpp,
            Language::Rust => cmds::codegen::Language::Rust,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum UniqueNames {
    None,
    Counter,
    Offset,
    CounterNumberAll,
}

impl From<UniqueNames> for UniqueNameMethod {
    fn from(method: UniqueNames) -> Self {
        match method {
            UniqueNames::None => UniqueNameMethod::None,
            UniqueNames::Counter => UniqueNameMethod::Counter,
            UniqueNames::Offset => UniqueNameMethod::Offset,
            UniqueNames::CounterNumberAll => UniqueNameMethod::CounterNumberAll,
        }
    }
}

impl NamingArgs {
    fn overrides(self, write_comments: Option<bool>) -> Overrides {
        Overrides {
            unique_names: self.unique_names.map(UniqueNameMethod::from),
            number_format: self.number_format,
            write_comments,
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Warn };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Codegen {
            defs_dir,
            params,
            language,
            output_dir,
            naming,
            comments,
            config,
            verbose,
        } => {
            init_logging(verbose);
            /* Only an explicit flag overrides the config file */
            let write_comments = comments.then_some(true);
            cmds::codegen::run(cmds::codegen::CodegenOptions {
                defs_dir,
                params,
                language: language.into(),
                output_dir,
                config,
                overrides: naming.overrides(write_comments),
                verbose,
            })?;
        }

        Commands::Analyze {
            defs_dir,
            params,
            print_ir,
            ir_format,
            naming,
            config,
            verbose,
        } => {
            init_logging(verbose);
            cmds::analyze::run(cmds::analyze::AnalyzeOptions {
                defs_dir,
                params,
                config,
                overrides: naming.overrides(None),
                print_ir,
                ir_format,
                verbose,
            })?;
        }
    }

    Ok(())
}
