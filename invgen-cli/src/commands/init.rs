//! `invgen init` — write a starter config.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use invgen_core::config;
use invgen_generate::TEMPLATE_EXTENSION;

use crate::Workspace;

/// Write a starter invgen.json.
#[derive(Args, Debug)]
pub struct InitArgs {}

impl InitArgs {
    pub fn run(self, workspace: &Workspace) -> Result<()> {
        let path = &workspace.config_path;
        config::init(path)
            .with_context(|| format!("failed to init config '{}'", path.display()))?;

        println!("{} Wrote {}", "✓".green(), path.display());
        println!("  Add `.{TEMPLATE_EXTENSION}` templates next to it, then run `invgen generate`.");
        Ok(())
    }
}
