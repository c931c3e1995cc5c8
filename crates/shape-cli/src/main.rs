//! # shape CLI entry point
//!
//! Parses command-line arguments, loads the optional configuration file,
//! and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use shape_cli::check::{run_check, CheckArgs};
use shape_cli::config::{CliConfig, OutputFormat, Overrides};
use shape_cli::inspect::{run_inspect, InspectArgs};

/// Exit code for a broken schema or an operational failure.
const EXIT_ERROR: u8 = 2;

/// shape: structural validation of JSON and YAML documents.
///
/// Checks documents against JSON Schema style constraint graphs and
/// reports, for every rejected document, the keyword and location that
/// caused the rejection.
#[derive(Parser, Debug)]
#[command(name = "shape", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, global = true)]
    format: Option<OutputFormat>,

    /// Drop unsupported schema keywords with a warning instead of failing.
    #[arg(long, global = true)]
    lenient: bool,

    /// Maximum nesting of schema evaluation.
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Maximum schema nodes evaluated per document.
    #[arg(long, global = true)]
    max_steps: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate documents against a schema.
    Check(CheckArgs),

    /// Summarize a schema and audit its references.
    Inspect(InspectArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins when set; otherwise verbosity picks the level.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match CliConfig::load_optional(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let settings = config.resolve(&Overrides {
        max_depth: cli.max_depth,
        max_steps: cli.max_steps,
        lenient: cli.lenient,
        format: cli.format,
    });
    tracing::debug!(?settings, "resolved settings");

    let result = match cli.command {
        Commands::Check(args) => run_check(&args, &settings),
        Commands::Inspect(args) => run_inspect(&args, &settings),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
