//! Metro CLI - publish Markdown documentation to Confluence.
//!
//! Provides commands for:
//! - `publish`: Create, update and delete the pages a manifest describes
//! - `check`: Validate a manifest and print the planned pages
//! - `render`: Convert one Markdown file to Confluence storage format

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CheckArgs, PublishArgs, RenderArgs};
use output::Output;

/// Metro - Markdown to Confluence publisher.
#[derive(Parser)]
#[command(name = "metro", version, about)]
struct Cli {
    /// Log progress (INFO level); otherwise `RUST_LOG` applies.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish the pages described by a manifest.
    Publish(PublishArgs),
    /// Validate a manifest and print what it would publish.
    Check(CheckArgs),
    /// Render a Markdown file to Confluence storage format.
    Render(RenderArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Publish(args) => args.execute(&output),
        Commands::Check(args) => args.execute(&output),
        Commands::Render(args) => args.execute(&output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}
