//! # bsync CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bsync_cli::config::OutputConfig;
use bsync_cli::render::{run_render, RenderArgs};
use bsync_cli::schema::{run_schema, SchemaArgs};

/// bsync: build BuildingSync documents from schema descriptors.
///
/// Inspects descriptor registries and renders documents described by
/// declarative recipes as XML or JSON.
#[derive(Parser, Debug)]
#[command(name = "bsync", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to an output configuration file (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Inspect schema descriptors.
    Schema(SchemaArgs),

    /// Build a document from a recipe and write it.
    Render(RenderArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "bsync CLI starting");

    let result = match cli.command {
        Commands::Schema(args) => run_schema(&args),
        Commands::Render(args) => OutputConfig::load_or_default(cli.config.as_deref())
            .and_then(|config| run_render(&args, &config)),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
