//! invgen — render files from templates and a JSON inventory.
//!
//! # Usage
//!
//! ```text
//! invgen init
//! invgen generate [--file <template>] [--dry-run]
//! invgen diff [--file <template>]
//! ```
//!
//! Global flags: `--dir <DIR>` (working directory, default `.`),
//! `--config <PATH>` (default `<DIR>/invgen.json`), `-v/--verbose`.

mod commands;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{diff::DiffArgs, generate::GenerateArgs, init::InitArgs};
use invgen_core::config;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "invgen",
    version,
    about = "Render files from templates and a JSON inventory",
    long_about = None,
)]
struct Cli {
    /// Working directory holding the config and the `.tmpl` files.
    #[arg(long, global = true, default_value = ".")]
    dir: PathBuf,

    /// Config file path (default: `<dir>/invgen.json`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log each step to stderr.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a starter invgen.json into the working directory.
    Init(InitArgs),

    /// Render every template and write the outputs.
    Generate(GenerateArgs),

    /// Show unified diff of what generate would write.
    Diff(DiffArgs),
}

/// Paths shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub dir: PathBuf,
    pub config_path: PathBuf,
}

impl Workspace {
    fn new(dir: PathBuf, config: Option<PathBuf>) -> Self {
        let config_path = config.unwrap_or_else(|| config::config_path_at(&dir));
        Self { dir, config_path }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let workspace = Workspace::new(cli.dir, cli.config);
    match cli.command {
        Commands::Init(args) => args.run(&workspace),
        Commands::Generate(args) => args.run(&workspace),
        Commands::Diff(args) => args.run(&workspace),
    }
}
