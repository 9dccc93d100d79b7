pub mod diff;
pub mod generate;
pub mod init;

use std::path::PathBuf;

use anyhow::{Context, Result};

use invgen_core::{config, Config};
use invgen_generate::TemplateSource;

use crate::Workspace;

/// Load the config named by the workspace.
pub(crate) fn load_config(workspace: &Workspace) -> Result<Config> {
    tracing::debug!("reading config {}", workspace.config_path.display());
    config::load(&workspace.config_path).with_context(|| {
        format!(
            "failed to read config '{}'",
            workspace.config_path.display()
        )
    })
}

/// `--file` given → that template only; otherwise scan the directory.
pub(crate) fn template_source(file: Option<PathBuf>) -> TemplateSource {
    match file {
        Some(path) => TemplateSource::File(path),
        None => TemplateSource::Discover,
    }
}
