//! Parsing and validation of `tessera.toml` project configuration files.
//!
//! This crate reads the project configuration file, merges any presets it
//! extends, and produces a strongly-typed [`ProjectConfig`] describing
//! conditions, breakpoints, utilities, recipes, slot recipes and patterns.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod merge;
pub mod types;

pub use error::ConfigError;
pub use loader::{
    config_dependencies, find_config, load_config, load_config_from_str, normalize_path,
    ConfigLoader, LoadedConfig, CONFIG_FILE,
};
pub use merge::merge_tables;
pub use types::*;
