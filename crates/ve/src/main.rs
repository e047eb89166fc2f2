//! VE CLI - Visual essays renderer.
//!
//! Provides commands for:
//! - `render`: Render an essay to a complete HTML page
//! - `source`: Show the resolved markdown of an essay, or list a prefix

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{RenderArgs, SourceArgs};
use output::Output;

/// Log targets raised to debug by `--verbose`.
const VERBOSE_FILTER: &str = "warn,ve=debug,ve_page=debug,ve_renderer=debug,ve_source=debug,ve_storage=debug";

/// VE - Visual essays renderer.
#[derive(Parser)]
#[command(name = "ve", version, about)]
struct Cli {
    /// Enable debug logging for rendering crates.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an essay to HTML.
    Render(RenderArgs),
    /// Print an essay's markdown or list a storage prefix.
    Source(SourceArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose wins over RUST_LOG; otherwise default to WARN
    let filter = if cli.verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Source(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
