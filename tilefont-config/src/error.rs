//! Typed error variants for the tilefont-config crate.
//!
//! `Config::load` returns these directly so the binary can tell a missing
//! file apart from a parse or validation problem when reporting startup and
//! reload failures.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("I/O error reading config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is empty.
    #[error("Config file is empty: {0}")]
    Empty(PathBuf),

    /// The config file contained invalid JSON.
    #[error("JSON parse error in config: {0}")]
    Json(#[from] serde_json::Error),

    /// The config file contained invalid YAML.
    #[error("YAML parse error in config: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// The config file extension is neither JSON nor YAML.
    #[error("Unsupported config format: {0} (expected .json, .yaml or .yml)")]
    UnsupportedFormat(PathBuf),

    /// A configured directory does not exist.
    #[error("The specified path for \"{kind}\" does not exist ({})", path.display())]
    MissingPath {
        /// Which path setting (e.g. `fonts`).
        kind: &'static str,
        path: PathBuf,
    },

    /// A field value failed semantic validation.
    #[error("Config validation error: {0}")]
    Validation(String),
}
