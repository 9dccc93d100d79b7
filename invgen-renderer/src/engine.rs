//! Tera rendering engine — [`RenderOptions`] and [`Renderer`].
//!
//! Every call builds a fresh [`Tera`] holding exactly one template plus the
//! helpers from a [`FunctionRegistry`]; nothing outlives the call.

use tera::Tera;

use invgen_core::{Config, Delimiters, Inventory};

use crate::context::to_tera_context;
use crate::error::RenderError;
use crate::functions::FunctionRegistry;
use crate::syntax;

/// Name the single template is registered under inside Tera.
pub const TEMPLATE_NAME: &str = "__invgen_template";

// ---------------------------------------------------------------------------
// RenderOptions
// ---------------------------------------------------------------------------

/// How placeholders are recognised and how missing keys are treated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub delimiters: Delimiters,
    /// Missing keys are errors when set.
    pub strict: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            delimiters: Delimiters::default(),
            strict: true,
        }
    }
}

impl RenderOptions {
    pub fn new(delimiters: Delimiters, strict: bool) -> Self {
        Self { delimiters, strict }
    }

    /// Delimiters and strictness from a loaded [`Config`].
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.delimiter.clone(), config.strict)
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Renders template text against an inventory.
///
/// Create once per run with [`Renderer::new`] and reuse; rendering takes
/// `&self` and is safe to call from several threads.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    /// Empty delimiter markers fall back to the defaults.
    pub fn new(options: RenderOptions) -> Self {
        let options = RenderOptions {
            delimiters: options.delimiters.normalized(),
            ..options
        };
        Renderer { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render `template` with `inventory` as the top-level context.
    ///
    /// Returns the complete output or an error; never partial output.
    pub fn render(
        &self,
        template: &str,
        inventory: &Inventory,
        functions: &FunctionRegistry,
    ) -> Result<String, RenderError> {
        let translation =
            syntax::translate(template, &self.options.delimiters, self.options.strict)?;
        // Tera reads an undefined name in `if` as false; strict mode does not.
        if self.options.strict {
            let missing = translation
                .condition_keys
                .iter()
                .find(|key| !inventory.contains_key(key.as_str()));
            if let Some(key) = missing {
                return Err(RenderError::MissingKey { key: key.clone() });
            }
        }
        tracing::debug!(
            left = %self.options.delimiters.left,
            right = %self.options.delimiters.right,
            strict = self.options.strict,
            "rendering template ({} bytes)",
            template.len()
        );

        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        functions.register(&mut tera);
        tera.add_raw_template(TEMPLATE_NAME, &translation.source)
            .map_err(RenderError::syntax)?;

        let ctx = to_tera_context(inventory);
        tera.render(TEMPLATE_NAME, &ctx).map_err(RenderError::evaluation)
    }
}

/// One-shot strict render with explicit delimiters.
pub fn render(
    template: &str,
    inventory: &Inventory,
    functions: &FunctionRegistry,
    delimiters: &Delimiters,
) -> Result<String, RenderError> {
    Renderer::new(RenderOptions::new(delimiters.clone(), true)).render(template, inventory, functions)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
