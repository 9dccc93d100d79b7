//! Loading and saving `invgen.json`.
//!
//! # API pattern
//!
//! - `fn_at(dir: &Path, …)` — explicit working directory; used in tests with `TempDir`
//! - `fn(path: &Path, …)` — explicit file path (the CLI's `--config` flag)

use std::path::{Path, PathBuf};

use serde_json::json;

use crate::error::{io_err, ConfigError};
use crate::types::{Config, Delimiters, Inventory};

/// Config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "invgen.json";

/// `<dir>/invgen.json` — pure, no I/O.
pub fn config_path_at(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load a config from an explicit file path.
///
/// Returns `ConfigError::NotFound` if absent, `ConfigError::Parse` (with
/// path + line context) if malformed. Empty delimiter markers are replaced
/// with the defaults.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let mut config: Config = serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    config.delimiter = config.delimiter.normalized();
    Ok(config)
}

/// Load `<dir>/invgen.json`.
pub fn load_at(dir: &Path) -> Result<Config, ConfigError> {
    load(&config_path_at(dir))
}

// ---------------------------------------------------------------------------
// Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save a config to `path`.
///
/// Write flow: serialize → `.tmp` sibling → `rename`. The `.tmp` file lives
/// in the same directory as the target so the rename never crosses
/// filesystems.
pub fn save(path: &Path, config: &Config) -> Result<(), ConfigError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| CONFIG_FILE_NAME.to_string());
    let tmp_path = path.with_file_name(format!("{file_name}.tmp"));

    let mut body = serde_json::to_string_pretty(config)?;
    body.push('\n');
    std::fs::write(&tmp_path, body).map_err(|e| io_err(&tmp_path, e))?;
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(io_err(path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------

/// Config written by `invgen init`.
pub fn starter() -> Config {
    let mut inventory = Inventory::new();
    inventory.insert("AppName".to_string(), json!("my-app"));
    inventory.insert("Replicas".to_string(), json!(2));
    Config {
        inventory,
        delimiter: Delimiters::default(),
        strict: true,
    }
}

/// Write a starter config to `path`.
///
/// Fails with `ConfigError::AlreadyExists` rather than overwriting.
pub fn init(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    save(path, &starter())
}

/// Write a starter config to `<dir>/invgen.json`.
pub fn init_at(dir: &Path) -> Result<PathBuf, ConfigError> {
    let path = config_path_at(dir);
    init(&path)?;
    Ok(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
