//! Core `Config` struct definition.
//!
//! The layout follows the tileserver-style `config.json`: everything the
//! glyph server reads lives under `options`. Other top-level sections
//! (`styles`, `data`, ...) belong to the rendering side and are ignored.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub options: Options,

    /// Canonical path of the file this config was loaded from.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Server options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    /// Resource directories
    #[serde(default)]
    pub paths: PathsConfig,

    /// Serve any font present in the fonts directory, ignoring `allowedFonts`
    #[serde(default = "crate::defaults::bool_false")]
    pub serve_all_fonts: bool,

    /// Fonts that may be served, in fallback preference order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_fonts: Option<Vec<String>>,

    /// Substitution candidates used when no allow-list applies.
    /// When unset, every font found in the fonts directory is a candidate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_fonts: Option<Vec<String>>,

    /// Upper bound on one glyph request, in milliseconds
    #[serde(default = "crate::defaults::font_request_timeout_ms")]
    pub font_request_timeout_ms: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            serve_all_fonts: crate::defaults::bool_false(),
            allowed_fonts: None,
            fallback_fonts: None,
            font_request_timeout_ms: crate::defaults::font_request_timeout_ms(),
        }
    }
}

/// Resource directory settings.
///
/// `root` is relative to the config file's directory; the other paths are
/// relative to `root`. Absolute paths are used as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathsConfig {
    #[serde(default = "crate::defaults::root_path")]
    pub root: String,

    #[serde(default = "crate::defaults::fonts_path")]
    pub fonts: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: crate::defaults::root_path(),
            fonts: crate::defaults::fonts_path(),
        }
    }
}
