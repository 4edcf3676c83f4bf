//! funcspan CLI - list named JavaScript/TypeScript functions or print one's source

// Global invariants enforced:
// - The input file is read exactly once
// - Stdout carries only the report; diagnostics go to stderr
// - Each failure kind maps to its own exit code

mod logging;

use clap::Parser;
use funcspan_core::config;
use funcspan_core::{function_entries, load_document, render_json, render_text, Error};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

#[derive(Parser)]
#[command(name = "funcspan")]
#[command(about = "List named functions in a script, or print the source of one of them")]
#[command(version)]
struct Cli {
    /// Script to read (.js, .jsx, .ts, .tsx, .mjs, .cjs, .html)
    file: PathBuf,

    /// Print the source of this function instead of listing names
    function: Option<String>,

    /// Output format
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    /// Path to config file (default: auto-discover next to FILE)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log debug details to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let resolved = config::load_and_resolve(&cli.file, cli.config.as_deref())?;
    logging::init(cli.verbose, resolved.log_level);

    if let Some(path) = &resolved.config_path {
        debug!("using config: {}", path.display());
    }

    let document = load_document(&cli.file, &resolved)?;
    let table = document.functions(&resolved.collect)?;
    debug!(count = table.len(), file = %cli.file.display(), "discovered functions");

    match &cli.function {
        None => {
            let entries = function_entries(&table);
            match cli.format {
                OutputFormat::Text => print!("{}", render_text(&entries)),
                OutputFormat::Json => println!("{}", render_json(&entries)),
            }
        }
        Some(name) => {
            let source = document.function_source(&table, name)?;
            match cli.format {
                OutputFormat::Text => println!("{}", source),
                OutputFormat::Json => {
                    let node = table.require(name)?;
                    let value = serde_json::json!({
                        "name": name,
                        "start": node.span.start,
                        "end": node.span.end,
                        "line": node.lineno,
                        "form": node.form,
                        "source": source,
                    });
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
            }
        }
    }

    Ok(())
}

/// Exit status for a failed run
///
/// 1 config or other failure, 2 usage (clap), 3 read failure, 4 parse failure,
/// 5 malformed syntax tree, 6 unknown function name, 7 unsupported file.
fn exit_code(err: &anyhow::Error) -> u8 {
    let core = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<Error>());

    match core {
        Some(Error::Io { .. }) => 3,
        Some(Error::Parse { .. }) => 4,
        Some(Error::Structural(_)) => 5,
        Some(Error::NameNotFound { .. }) => 6,
        Some(Error::UnsupportedFile { .. }) => 7,
        Some(Error::Thread(_)) | None => 1,
    }
}
