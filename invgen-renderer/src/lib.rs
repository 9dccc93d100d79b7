//! # invgen-renderer
//!
//! Tera-based engine that renders template text against an inventory, with
//! configurable placeholder delimiters, strict missing-key handling, and a
//! small helper set (`var`, `getenv`, `getenvRequired`, arithmetic, `indent`,
//! `yaml`).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use invgen_core::{Delimiters, Inventory};
//! use invgen_renderer::{FunctionRegistry, RenderOptions, Renderer};
//!
//! fn render_one(inventory: Inventory, template: &str) -> Option<String> {
//!     let inventory = Arc::new(inventory);
//!     let functions = FunctionRegistry::with_process_env(Arc::clone(&inventory));
//!     let renderer = Renderer::new(RenderOptions::new(Delimiters::new("[[", "]]"), true));
//!     renderer.render(template, &inventory, &functions).ok()
//! }
//! ```

pub mod context;
pub mod engine;
pub mod env;
pub mod error;
pub mod functions;
pub mod numeric;
mod syntax;

pub use engine::{render, RenderOptions, Renderer};
pub use env::{EnvSource, MapEnv, ProcessEnv};
pub use error::{FunctionError, RenderError};
pub use functions::FunctionRegistry;
pub use numeric::{classify, Kind, Number, Operator};
