//! Server configuration management.
//!
//! # Sub-modules
//!
//! - [`config_struct`]: Core `Config` struct and its option sections
//! - [`persistence`]: `impl Config` methods for loading, parsing and validation
//! - [`path_validation`]: `impl Config` methods for resource path resolution
//! - [`font_methods`]: `impl Config` methods deriving the font serving policy

pub mod config_struct;
pub mod font_methods;
pub mod path_validation;
pub mod persistence;

pub use config_struct::{Config, Options, PathsConfig};
pub use persistence::ConfigFormat;
