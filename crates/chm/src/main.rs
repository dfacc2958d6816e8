//! chm CLI - Sphinx HTML to HTML Help converter.
//!
//! Provides commands for:
//! - `build`: Write the `.hhc`, `.hhk` and `.hhp` files, normalize pages and
//!   optionally run the help compiler
//! - `check`: Collect the navigation without writing anything

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, CheckArgs};
use output::Output;

/// chm - Sphinx HTML to HTML Help converter.
#[derive(Parser)]
#[command(name = "chm", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the HTML Help project in the documentation root.
    Build(BuildArgs),
    /// Collect table of contents and keyword index without writing.
    Check(CheckArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::Build(args) => args.common.verbose,
            Self::Check(args) => args.common.verbose,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.command.verbose() {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(),
        Commands::Check(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
