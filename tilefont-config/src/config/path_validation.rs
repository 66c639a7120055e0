//! Resource path resolution and existence checks for `Config`.

use super::config_struct::Config;
use crate::error::ConfigError;
use std::path::{Path, PathBuf};

impl Config {
    /// Directory relative paths are resolved against: the config file's
    /// directory, or the working directory for in-memory configs.
    pub fn base_dir(&self) -> PathBuf {
        self.source
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Resolved `paths.root`.
    pub fn root_dir(&self) -> PathBuf {
        self.base_dir().join(&self.options.paths.root)
    }

    /// Resolved `paths.fonts`: the base directory of all glyph ranges.
    pub fn fonts_dir(&self) -> PathBuf {
        self.root_dir().join(&self.options.paths.fonts)
    }

    /// Check that every directory the glyph server reads from exists.
    pub fn check_paths(&self) -> Result<(), ConfigError> {
        let fonts = self.fonts_dir();
        if !fonts.is_dir() {
            return Err(ConfigError::MissingPath {
                kind: "fonts",
                path: fonts,
            });
        }
        Ok(())
    }
}
