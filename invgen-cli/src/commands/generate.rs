//! `invgen generate` — render templates and write the outputs.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use invgen_generate::{pipeline, WriteResult};
use invgen_renderer::ProcessEnv;

use super::{load_config, template_source};
use crate::Workspace;

/// Arguments for `invgen generate`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Render only this template instead of scanning the directory.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Show what would be written without actually writing any files.
    #[arg(long)]
    pub dry_run: bool,
}

impl GenerateArgs {
    pub fn run(self, workspace: &Workspace) -> Result<()> {
        let config = load_config(workspace)?;
        let source = template_source(self.file);

        let results = pipeline::run(
            &config,
            workspace.dir(),
            &source,
            self.dry_run,
            Arc::new(ProcessEnv),
        )
        .context("generate failed")?;

        print_results(workspace, &results, self.dry_run);
        Ok(())
    }
}

fn print_results(workspace: &Workspace, writes: &[WriteResult], dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let changed = writes
        .iter()
        .filter(|r| !matches!(r, WriteResult::Unchanged { .. }))
        .count();

    println!(
        "{prefix}{} generated ({} written, {} unchanged)",
        "✓".green(),
        changed,
        writes.len() - changed
    );

    for r in writes {
        let shown = r.path().strip_prefix(workspace.dir()).unwrap_or(r.path());
        match r {
            WriteResult::Written { .. } => println!("  {}  {}", "✎".green(), shown.display()),
            WriteResult::WouldWrite { .. } => println!("  {}  {}", "~".yellow(), shown.display()),
            WriteResult::Unchanged { .. } => println!("  {}  {}", "·".dimmed(), shown.display()),
        }
    }
}
