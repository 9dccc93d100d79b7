//! Error types for invgen-generate.

use std::path::PathBuf;

use thiserror::Error;

use invgen_core::ConfigError;
use invgen_renderer::RenderError;

/// All errors that can arise from a generation run.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// An error loading the configuration.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A template failed to render; nothing is written for the run.
    #[error("failed to render {template}: {source}")]
    Render {
        template: PathBuf,
        #[source]
        source: RenderError,
    },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Discovery found no `.tmpl` files.
    #[error("no template file specified or found in {dir}")]
    NoTemplates { dir: PathBuf },

    /// An explicit template path lacks the `.tmpl` extension.
    #[error("{path} is not a template (expected a .tmpl extension)")]
    NotATemplate { path: PathBuf },
}

/// Convenience constructor for [`GenerateError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> GenerateError {
    GenerateError::Io {
        path: path.into(),
        source,
    }
}
