//! Practicum — student portfolio roster sync CLI.
//!
//! # Usage
//!
//! ```text
//! practicum [--root <dir>] [-v...] init
//! practicum sync <csv> [--course <code>] [--semester <term year>] [--dry-run]
//! practicum diff <csv> [--course <code>] [--semester <term year>]
//! practicum status [--json]
//! practicum render [--dry-run]
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    diff::DiffArgs, init::InitArgs, render::RenderArgs, status::StatusArgs, sync::SyncArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "practicum",
    version,
    about = "Sync practicum rosters into student portfolio folders",
    long_about = None,
)]
struct Cli {
    /// Repository root holding practicum.yaml and the student folders.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default practicum.yaml if none exists.
    Init(InitArgs),

    /// Merge a roster CSV into the student folders.
    Sync(SyncArgs),

    /// Show unified diff of what sync would write for a roster.
    Diff(DiffArgs),

    /// List students and the provenance of their profile sections.
    Status(StatusArgs),

    /// Publish HTML profile pages and course indexes.
    Render(RenderArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Init(args) => args.run(&cli.root),
        Commands::Sync(args) => args.run(&cli.root),
        Commands::Diff(args) => args.run(&cli.root),
        Commands::Status(args) => args.run(&cli.root),
        Commands::Render(args) => args.run(&cli.root),
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
