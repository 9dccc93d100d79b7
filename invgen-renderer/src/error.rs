//! Error types for invgen-renderer.

use std::error::Error as StdError;

use thiserror::Error;

/// All errors that can arise from rendering a single template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// Placeholder text could not be parsed with the configured delimiters.
    #[error("template syntax error: {message}")]
    TemplateSyntax { message: String },

    /// Strict mode: a referenced key does not exist in the inventory.
    #[error("map has no entry for key `{key}`")]
    MissingKey { key: String },

    /// A template function or filter failed. `args` is the call's argument
    /// list as written back from the evaluated values (empty for built-ins).
    #[error("error calling {name}({args}): {message}")]
    Function {
        name: String,
        args: String,
        message: String,
    },

    /// Any other evaluation failure reported by the template engine.
    #[error("template evaluation failed: {message}")]
    Evaluation { message: String },
}

/// Failures raised by the helpers in [`crate::functions`] and [`crate::numeric`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FunctionError {
    /// `var` was asked for a key the inventory does not hold.
    #[error("No value found for key: {key}")]
    MissingKey { key: String },

    /// `getenvRequired` found the variable unset or empty.
    #[error("No environment variable value found for key: {key}")]
    MissingEnv { key: String },

    /// An operand is not a number the operator accepts.
    #[error("{op}: unknown type for {value} ({type_name})")]
    UnknownType {
        op: &'static str,
        value: String,
        type_name: &'static str,
    },

    /// Integer division or modulo by zero.
    #[error("{op}: division by zero")]
    DivisionByZero { op: &'static str },

    /// Integer result (or widening) does not fit the target kind.
    #[error("{op}: integer overflow")]
    Overflow { op: &'static str },

    /// Missing or mistyped argument.
    #[error("{func}: {message}")]
    InvalidArgument { func: &'static str, message: String },

    /// Value could not be serialized as YAML.
    #[error("yaml: {0}")]
    Yaml(String),
}

/// A helper failure together with the arguments it was called with.
///
/// Travels inside the `tera::Error` source chain so the call site survives
/// Tera's own wrapping.
#[derive(Debug, Error)]
#[error("{error}")]
pub(crate) struct CallFailure {
    pub(crate) args: String,
    pub(crate) error: FunctionError,
}

impl From<CallFailure> for tera::Error {
    fn from(failure: CallFailure) -> Self {
        tera::Error::chain(failure.error.to_string(), failure)
    }
}

// ---------------------------------------------------------------------------
// tera::Error classification
// ---------------------------------------------------------------------------

const MISSING_VARIABLE_PREFIX: &str = "Variable `";
const MISSING_VARIABLE_MARKER: &str = "not found in context";

/// Every message in the source chain, outermost first.
fn chain_messages(err: &(dyn StdError + 'static)) -> Vec<String> {
    let mut messages = Vec::new();
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        messages.push(e.to_string());
        current = e.source();
    }
    messages
}

fn innermost_message(err: &(dyn StdError + 'static)) -> String {
    chain_messages(err).pop().unwrap_or_default()
}

fn call_args(err: &(dyn StdError + 'static)) -> Option<String> {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        if let Some(failure) = e.downcast_ref::<CallFailure>() {
            return Some(failure.args.clone());
        }
        current = e.source();
    }
    None
}

fn missing_variable(message: &str) -> Option<String> {
    if !message.starts_with(MISSING_VARIABLE_PREFIX) || !message.contains(MISSING_VARIABLE_MARKER) {
        return None;
    }
    let rest = &message[MISSING_VARIABLE_PREFIX.len()..];
    rest.find('`').map(|end| rest[..end].to_string())
}

impl RenderError {
    /// Classify an error returned by [`tera::Tera::add_raw_template`].
    pub(crate) fn syntax(err: tera::Error) -> Self {
        RenderError::TemplateSyntax {
            message: chain_messages(&err).join(": "),
        }
    }

    /// Classify an error returned by [`tera::Tera::render`].
    ///
    /// Function and filter failures are recognised structurally through
    /// `ErrorKind::CallFunction` / `ErrorKind::CallFilter`; a missing
    /// variable only surfaces as a message.
    pub(crate) fn evaluation(err: tera::Error) -> Self {
        let mut current: Option<&(dyn StdError + 'static)> = Some(&err);
        while let Some(e) = current {
            if let Some(tera_err) = e.downcast_ref::<tera::Error>() {
                match &tera_err.kind {
                    tera::ErrorKind::CallFunction(name) | tera::ErrorKind::CallFilter(name) => {
                        return RenderError::Function {
                            name: name.clone(),
                            args: call_args(e).unwrap_or_default(),
                            message: innermost_message(e),
                        };
                    }
                    _ => {}
                }
            }
            if let Some(key) = missing_variable(&e.to_string()) {
                return RenderError::MissingKey { key };
            }
            current = e.source();
        }
        RenderError::Evaluation {
            message: chain_messages(&err).join(": "),
        }
    }
}
