//! invgen core library — configuration types, config persistence, errors.
//!
//! - [`types`] — [`Config`], [`Delimiters`], [`Inventory`]
//! - [`error`] — [`ConfigError`]
//! - [`config`] — load / save / init

pub mod config;
pub mod error;
pub mod types;

pub use error::ConfigError;
pub use types::{Config, Delimiters, Inventory, DEFAULT_LEFT_DELIMITER, DEFAULT_RIGHT_DELIMITER};
