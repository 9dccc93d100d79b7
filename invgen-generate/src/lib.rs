//! # invgen-generate
//!
//! Template discovery, rendering, and atomic output writing.
//!
//! Call [`pipeline::run`] to render every template in a directory and write
//! the results, or [`diff_at`] to see what a run would change.

pub mod diff;
pub mod discovery;
pub mod error;
pub mod pipeline;
pub mod writer;

pub use diff::{diff_at, FileDiff};
pub use discovery::{TemplateSource, TEMPLATE_EXTENSION};
pub use error::GenerateError;
pub use pipeline::{render_templates, RenderedTemplate};
pub use writer::WriteResult;
