//! `invgen diff` — show unified diffs for what generate would write.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use invgen_generate::diff_at;
use invgen_renderer::ProcessEnv;

use super::{load_config, template_source};
use crate::Workspace;

/// Arguments for `invgen diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Diff only this template instead of scanning the directory.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl DiffArgs {
    pub fn run(self, workspace: &Workspace) -> Result<()> {
        let config = load_config(workspace)?;
        let source = template_source(self.file);

        let diffs = diff_at(&config, workspace.dir(), &source, Arc::new(ProcessEnv))
            .context("diff failed")?;

        if diffs.is_empty() {
            println!("No differences.");
            return Ok(());
        }

        for diff in diffs {
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }

        Ok(())
    }
}
