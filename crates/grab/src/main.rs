//! Grab CLI - representative media grabber.
//!
//! Provides commands for:
//! - `render`: Print the media found in a content item
//! - `split`: Print a content item's body with its media removed

mod commands;
mod engine;
mod error;
mod output;
mod site;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::GrabArgs;
use output::Output;

/// Grab - find, resize and split the media of a content item.
#[derive(Parser)]
#[command(name = "grab", version, about)]
struct Cli {
    /// Path to configuration file (default: auto-discover grab.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output (log each location strategy).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the rendered media of a content item.
    Render(GrabArgs),
    /// Print a content item's body with the located media removed.
    Split(GrabArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Render(args) => commands::render::execute(&args, config),
        Commands::Split(args) => commands::split::execute(&args, config),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
