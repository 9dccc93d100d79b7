//! Shared generation entrypoint used by `invgen generate` and `invgen diff`.
//!
//! Every template is rendered before anything is written, so a failing
//! template leaves the filesystem untouched.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use invgen_core::Config;
use invgen_renderer::{EnvSource, FunctionRegistry, RenderOptions, Renderer};

use crate::discovery::{self, TemplateSource};
use crate::error::{io_err, GenerateError};
use crate::writer::{atomic_write, WriteResult};

/// One template and the text it renders to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTemplate {
    pub template: PathBuf,
    pub output: PathBuf,
    pub content: String,
}

/// Render `templates` with the inventory and options from `config`.
///
/// Stops at the first failure.
pub fn render_templates(
    config: &Config,
    templates: &[PathBuf],
    env: Arc<dyn EnvSource>,
) -> Result<Vec<RenderedTemplate>, GenerateError> {
    let inventory = Arc::new(config.inventory.clone());
    let functions = FunctionRegistry::new(Arc::clone(&inventory), env);
    let renderer = Renderer::new(RenderOptions::from_config(config));

    let mut rendered = Vec::with_capacity(templates.len());
    for template in templates {
        let output = discovery::output_path(template).ok_or_else(|| GenerateError::NotATemplate {
            path: template.clone(),
        })?;
        tracing::debug!("rendering {} => {}", template.display(), output.display());

        let text = std::fs::read_to_string(template).map_err(|e| io_err(template, e))?;
        let content = renderer
            .render(&text, &inventory, &functions)
            .map_err(|source| GenerateError::Render {
                template: template.clone(),
                source,
            })?;
        rendered.push(RenderedTemplate {
            template: template.clone(),
            output,
            content,
        });
    }
    Ok(rendered)
}

/// Resolve templates under `dir`, render them all, then write the outputs.
pub fn run(
    config: &Config,
    dir: &Path,
    source: &TemplateSource,
    dry_run: bool,
    env: Arc<dyn EnvSource>,
) -> Result<Vec<WriteResult>, GenerateError> {
    let templates = discovery::resolve(dir, source)?;
    let rendered = render_templates(config, &templates, env)?;
    rendered
        .iter()
        .map(|r| atomic_write(&r.output, &r.content, dry_run))
        .collect()
}
