//! Command line front end: grammar file in, parser source out.

use clap::Parser;
use llgen::{read_dialect, CodegenOptions, Dialect, GenerateError, Generator};
use log::LevelFilter;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "llgen")]
#[command(about = "Generates an LL(1) recursive-descent parser from a grammar file")]
struct Args {
    /// Grammar file to compile
    grammar: PathBuf,

    /// Write the generated source here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON file overriding the reserved literals of the grammar format
    #[arg(long)]
    dialect: Option<PathBuf>,

    /// Path of the runtime module as seen from the generated code
    #[arg(long, default_value = "::llgen::rt")]
    runtime: String,

    /// Print the factored decision tree of every rule instead of code
    #[arg(long)]
    dump_branches: bool,

    /// Raise the log level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error("invalid runtime path `{path}`: {source}")]
    Runtime { path: String, source: syn::Error },
    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_default_env();
    logger.format_timestamp(None);
    match args.verbose {
        0 => {}
        1 => {
            logger.filter_level(LevelFilter::Info);
        }
        2 => {
            logger.filter_level(LevelFilter::Debug);
        }
        _ => {
            logger.filter_level(LevelFilter::Trace);
        }
    }
    logger.init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let dialect = match &args.dialect {
        Some(path) => read_dialect(path)?,
        None => Dialect::default(),
    };
    let runtime = syn::parse_str(&args.runtime).map_err(|source| CliError::Runtime {
        path: args.runtime.clone(),
        source,
    })?;

    let (root, file) = split_path(&args.grammar);
    let generator = Generator::new(root)
        .with_dialect(dialect)
        .with_options(CodegenOptions { runtime });

    let output = if args.dump_branches {
        generator
            .branches(&file)?
            .iter()
            .map(|f| f.to_string())
            .collect::<String>()
    } else {
        format!("{}\n", generator.generate(&file)?)
    };

    match &args.output {
        Some(path) => fs::write(path, output).map_err(|source| CliError::Write {
            path: path.clone(),
            source,
        }),
        None => {
            print!("{}", output);
            Ok(())
        }
    }
}

/// Splits a grammar path into the generator root and the file name.
fn split_path(path: &std::path::Path) -> (PathBuf, String) {
    let root = path.parent().map(PathBuf::from).unwrap_or_default();
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    (root, file)
}
