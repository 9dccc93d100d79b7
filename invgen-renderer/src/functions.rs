//! Template helpers bound to one inventory and one environment.
//!
//! | name             | function form                 | filter form              |
//! |------------------|-------------------------------|--------------------------|
//! | `var`            | `var(key="K")`                | —                        |
//! | `getenv`         | `getenv(key="K")`             | —                        |
//! | `getenvRequired` | `getenvRequired(key="K")`     | —                        |
//! | `add` …`modulo`  | `add(a=5, b=2)`               | `5 \| add(b=2)`          |
//! | `indent`         | `indent(value=s, width=2)`    | `s \| indent(width=2)`   |
//! | `yaml`           | `yaml(value=v)`               | `v \| yaml`              |

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tera::Tera;

use invgen_core::Inventory;

use crate::env::{EnvSource, ProcessEnv};
use crate::error::{CallFailure, FunctionError};
use crate::numeric::{self, Operator};

/// Default `indent` width.
pub const DEFAULT_INDENT_WIDTH: usize = 2;

type Args = HashMap<String, Value>;

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

fn arg<'a>(func: &'static str, args: &'a Args, name: &str) -> Result<&'a Value, FunctionError> {
    args.get(name).ok_or_else(|| FunctionError::InvalidArgument {
        func,
        message: format!("missing argument `{name}`"),
    })
}

fn str_arg<'a>(func: &'static str, args: &'a Args, name: &str) -> Result<&'a str, FunctionError> {
    arg(func, args, name)?
        .as_str()
        .ok_or_else(|| FunctionError::InvalidArgument {
            func,
            message: format!("argument `{name}` must be a string"),
        })
}

fn width_arg(args: &Args) -> Result<usize, FunctionError> {
    match args.get("width") {
        None => Ok(DEFAULT_INDENT_WIDTH),
        Some(v) => v
            .as_u64()
            .and_then(|w| usize::try_from(w).ok())
            .ok_or_else(|| FunctionError::InvalidArgument {
                func: "indent",
                message: "argument `width` must be a non-negative integer".to_string(),
            }),
    }
}

/// Strings render as-is; anything else through its JSON form.
fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

/// Prefix every line of `text` with `width` spaces.
///
/// Empty input stays empty; a trailing newline is followed by indentation.
pub fn indent(width: usize, text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let pad = " ".repeat(width);
    let mut out = String::with_capacity(text.len() + pad.len());
    out.push_str(&pad);
    out.push_str(&text.replace('\n', &format!("\n{pad}")));
    out
}

/// Serialize `value` as a YAML document.
pub fn yaml(value: &Value) -> Result<String, FunctionError> {
    serde_yaml::to_string(value).map_err(|e| FunctionError::Yaml(e.to_string()))
}

// ---------------------------------------------------------------------------
// FunctionRegistry
// ---------------------------------------------------------------------------

/// The helper set for one render call.
///
/// Cloning is cheap; the inventory and environment are shared.
#[derive(Clone)]
pub struct FunctionRegistry {
    inventory: Arc<Inventory>,
    env: Arc<dyn EnvSource>,
}

impl FunctionRegistry {
    pub fn new(inventory: Arc<Inventory>, env: Arc<dyn EnvSource>) -> Self {
        Self { inventory, env }
    }

    /// Registry reading the real process environment.
    pub fn with_process_env(inventory: Arc<Inventory>) -> Self {
        Self::new(inventory, Arc::new(ProcessEnv))
    }

    /// Every helper name registered by [`FunctionRegistry::register`].
    pub fn names() -> Vec<&'static str> {
        let mut names = vec!["var", "getenv", "getenvRequired"];
        names.extend(Operator::all().iter().map(Operator::name));
        names.extend(["indent", "yaml"]);
        names
    }

    /// `var`: inventory lookup that fails on a missing key.
    pub fn var(&self, key: &str) -> Result<Value, FunctionError> {
        self.inventory
            .get(key)
            .cloned()
            .ok_or_else(|| FunctionError::MissingKey { key: key.to_string() })
    }

    /// `getenv`: empty string when unset.
    pub fn getenv(&self, key: &str) -> String {
        self.env.get(key).unwrap_or_default()
    }

    /// `getenvRequired`: unset and empty are both failures.
    pub fn getenv_required(&self, key: &str) -> Result<String, FunctionError> {
        match self.env.get(key) {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(FunctionError::MissingEnv { key: key.to_string() }),
        }
    }

    /// Install every helper into `tera`, replacing built-ins of the same name.
    pub fn register(&self, tera: &mut Tera) {
        let this = self.clone();
        tera.register_function("var", move |args: &Args| {
            function_call(args, || this.var(str_arg("var", args, "key")?))
        });

        let this = self.clone();
        tera.register_function("getenv", move |args: &Args| {
            function_call(args, || {
                Ok(Value::String(this.getenv(str_arg("getenv", args, "key")?)))
            })
        });

        let this = self.clone();
        tera.register_function("getenvRequired", move |args: &Args| {
            function_call(args, || {
                let key = str_arg("getenvRequired", args, "key")?;
                Ok(Value::String(this.getenv_required(key)?))
            })
        });

        for &op in Operator::all() {
            tera.register_function(op.name(), move |args: &Args| {
                function_call(args, || {
                    let a = arg(op.name(), args, "a")?;
                    let b = arg(op.name(), args, "b")?;
                    numeric::apply_values(op, b, a)
                })
            });
            tera.register_filter(op.name(), move |value: &Value, args: &Args| {
                filter_call(value, args, || {
                    let b = arg(op.name(), args, "b")?;
                    numeric::apply_values(op, b, value)
                })
            });
        }

        tera.register_function("indent", |args: &Args| {
            function_call(args, || {
                let text = text_of(arg("indent", args, "value")?);
                Ok(Value::String(indent(width_arg(args)?, &text)))
            })
        });
        tera.register_filter("indent", |value: &Value, args: &Args| {
            filter_call(value, args, || {
                Ok(Value::String(indent(width_arg(args)?, &text_of(value))))
            })
        });

        tera.register_function("yaml", |args: &Args| {
            function_call(args, || Ok(Value::String(yaml(arg("yaml", args, "value")?)?)))
        });
        tera.register_filter("yaml", |value: &Value, args: &Args| {
            filter_call(value, args, || Ok(Value::String(yaml(value)?)))
        });
    }
}

// ---------------------------------------------------------------------------
// Call-site context
// ---------------------------------------------------------------------------

/// `k=v` pairs sorted by name; values in their JSON form.
fn describe_args(args: &Args) -> String {
    let mut pairs: Vec<_> = args.iter().collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    pairs
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn function_call(
    args: &Args,
    call: impl FnOnce() -> Result<Value, FunctionError>,
) -> tera::Result<Value> {
    call().map_err(|error| {
        CallFailure {
            args: describe_args(args),
            error,
        }
        .into()
    })
}

/// The piped value is listed first, ahead of the named arguments.
fn filter_call(
    value: &Value,
    args: &Args,
    call: impl FnOnce() -> Result<Value, FunctionError>,
) -> tera::Result<Value> {
    call().map_err(|error| {
        let named = describe_args(args);
        let args = if named.is_empty() {
            value.to_string()
        } else {
            format!("{value}, {named}")
        };
        CallFailure { args, error }.into()
    })
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("inventory_keys", &self.inventory.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
