//! Configuration system for the tilefont glyph server.
//!
//! This crate provides:
//!
//! - Config file loading (JSON or YAML) and validation
//! - Resource path resolution relative to the config file
//! - The font allow-list and fallback policy derived from the config
//! - Configuration file watching for hot reload

pub mod config;
pub mod defaults;
pub mod error;
#[cfg(feature = "watcher")]
pub mod watcher;

// Re-export main types for convenience
pub use config::{Config, ConfigFormat, Options, PathsConfig};
pub use error::ConfigError;
