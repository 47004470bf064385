mod settings;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use natives_codegen::{
    CodegenError, FileSystemProvider, GeneratedDocument, SourceAssembler, WriteOutcome,
};
use tracing_subscriber::EnvFilter;

use settings::{Overrides, Settings};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Embed scripts and data files into a generated C++ source.
#[derive(Parser)]
#[command(
    name = "natives",
    version,
    about = "Embed scripts and data files into a generated C++ source"
)]
struct Cli {
    /// Path of the generated source file
    #[arg(value_name = "OUTPUT")]
    target: PathBuf,

    /// Input files in registration order; definition files are picked out by suffix
    #[arg(value_name = "INPUTS", required = true)]
    inputs: Vec<PathBuf>,

    /// Read the output template from this file
    #[arg(short = 't', long = "template", value_name = "TEMPLATE")]
    template: Option<PathBuf>,

    /// Generator settings file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bound on macro nesting and expansion passes
    #[arg(long)]
    max_depth: Option<usize>,

    /// Output format (text or json)
    #[arg(long = "output", default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long)]
    quiet: bool,

    /// Log progress at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = match &cli.config {
        Some(path) => match settings::read_settings(path) {
            Ok(s) => s,
            Err(msg) => {
                report_error(&msg, cli.output, cli.quiet);
                process::exit(1);
            }
        },
        None => Settings::default(),
    };
    let overrides = Overrides {
        max_depth: cli.max_depth,
        template: cli.template.clone(),
    };
    let config = match settings::resolve(settings, overrides) {
        Ok(c) => c,
        Err(msg) => {
            report_error(&msg, cli.output, cli.quiet);
            process::exit(1);
        }
    };

    cmd_generate(
        &SourceAssembler::new(config),
        &cli.target,
        &cli.inputs,
        cli.output,
        cli.quiet,
    );
}

/// Logs go to stderr. `RUST_LOG` applies unless `--verbose` is given.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_generate(
    assembler: &SourceAssembler,
    target: &Path,
    inputs: &[PathBuf],
    output: OutputFormat,
    quiet: bool,
) {
    tracing::debug!(
        output = %target.display(),
        inputs = inputs.len(),
        max_depth = assembler.config().max_depth,
        "generating"
    );
    let result = assembler
        .assemble(inputs, &FileSystemProvider)
        .and_then(|doc| doc.write_if_changed(target).map(|outcome| (doc, outcome)));

    match result {
        Ok((doc, outcome)) => print_summary(target, &doc, outcome, output, quiet),
        Err(e) => {
            report_codegen_error(&e, output, quiet);
            process::exit(1);
        }
    }
}

fn print_summary(
    target: &Path,
    doc: &GeneratedDocument,
    outcome: WriteOutcome,
    output: OutputFormat,
    quiet: bool,
) {
    match output {
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "output": target.display().to_string(),
                "modules": doc.modules,
                "sha256": doc.sha256_hex(),
                "written": outcome == WriteOutcome::Written,
            });
            let pretty = serde_json::to_string_pretty(&summary)
                .unwrap_or_else(|e| format!("serialization error: {}", e));
            println!("{}", pretty);
        }
        OutputFormat::Text => {
            if quiet {
                return;
            }
            let status = match outcome {
                WriteOutcome::Written => "wrote",
                WriteOutcome::Unchanged => "unchanged",
            };
            println!(
                "{} {} ({} modules)",
                status,
                target.display(),
                doc.modules.len()
            );
        }
    }
}

fn report_codegen_error(e: &CodegenError, output: OutputFormat, quiet: bool) {
    match output {
        OutputFormat::Json => {
            let err_json = serde_json::to_string_pretty(&serde_json::json!({
                "error": e.to_json_value(),
            }))
            .unwrap_or_else(|_| format!("{{\"error\": \"{:?}\"}}", e));
            eprintln!("{}", err_json);
        }
        OutputFormat::Text => {
            if !quiet {
                eprintln!("error: {}", e);
            }
        }
    }
}

/// Text errors honor `--quiet`; JSON errors are always printed.
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    match output {
        OutputFormat::Text => {
            if !quiet {
                eprintln!("{}", msg);
            }
        }
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
