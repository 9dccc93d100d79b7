//! Configuration types shared by every invgen crate.
//!
//! The on-disk shape is JSON:
//!
//! ```json
//! {
//!   "inventory": { "KeyOne": "Value 1" },
//!   "delimiter": { "left": "[[", "right": "]]" },
//!   "strict": true
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default left placeholder marker.
pub const DEFAULT_LEFT_DELIMITER: &str = "{{";
/// Default right placeholder marker.
pub const DEFAULT_RIGHT_DELIMITER: &str = "}}";

/// Key-value data context that placeholders resolve against.
pub type Inventory = Map<String, Value>;

// ---------------------------------------------------------------------------
// Delimiters
// ---------------------------------------------------------------------------

/// Pair of markers bounding a placeholder expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delimiters {
    #[serde(default = "default_left")]
    pub left: String,
    #[serde(default = "default_right")]
    pub right: String,
}

fn default_left() -> String {
    DEFAULT_LEFT_DELIMITER.to_string()
}

fn default_right() -> String {
    DEFAULT_RIGHT_DELIMITER.to_string()
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            left: default_left(),
            right: default_right(),
        }
    }
}

impl Delimiters {
    /// Build a pair from explicit markers.
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    /// Replace empty markers with the defaults.
    pub fn normalized(self) -> Self {
        Self {
            left: if self.left.is_empty() { default_left() } else { self.left },
            right: if self.right.is_empty() { default_right() } else { self.right },
        }
    }

    /// `true` when both markers are the engine defaults.
    pub fn is_default(&self) -> bool {
        self.left == DEFAULT_LEFT_DELIMITER && self.right == DEFAULT_RIGHT_DELIMITER
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn default_strict() -> bool {
    true
}

/// Root of an `invgen.json` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub inventory: Inventory,
    #[serde(default)]
    pub delimiter: Delimiters,
    /// Missing keys are hard errors when set (the default).
    #[serde(default = "default_strict")]
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inventory: Inventory::new(),
            delimiter: Delimiters::default(),
            strict: default_strict(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
