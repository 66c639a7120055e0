//! Config loading and validation for `Config`.
//!
//! Covers:
//! - `load` (JSON or YAML by file extension)
//! - `from_json_str` / `from_yaml_str` for in-memory configs
//! - `validate` (semantic checks shared by startup and hot reload)

use super::config_struct::Config;
use crate::error::ConfigError;
use std::fs;
use std::path::Path;

/// Config file formats, picked by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Format for `path`, or `None` for unknown extensions.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Some(ConfigFormat::Json),
            Some("yaml") | Some("yml") => Some(ConfigFormat::Yaml),
            _ => None,
        }
    }
}

impl Config {
    /// Load and validate the configuration at `path`.
    ///
    /// # Errors
    /// Fails if the file is missing, empty, has an unknown extension, does
    /// not parse, or fails [`validate`](Self::validate).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        log::info!("Loading config from {}", path.display());

        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Err(ConfigError::Empty(path.to_path_buf()));
        }

        let mut config = match format {
            ConfigFormat::Json => Self::from_json_str(&contents)?,
            ConfigFormat::Yaml => Self::from_yaml_str(&contents)?,
        };

        config.source = Some(
            path.canonicalize()
                .unwrap_or_else(|_| path.to_path_buf()),
        );
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON config without touching the file system.
    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Parse a YAML config without touching the file system.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml_ng::from_str(contents)?)
    }

    /// Semantic checks that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let options = &self.options;

        if options.font_request_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "fontRequestTimeoutMs must be greater than 0".to_string(),
            ));
        }

        let lists = [
            ("allowedFonts", &options.allowed_fonts),
            ("fallbackFonts", &options.fallback_fonts),
        ];
        for (field, fonts) in lists {
            for font in fonts.iter().flatten() {
                if font.is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "{field} contains an empty font name"
                    )));
                }
                if font.contains(tilefont_glyphs::composer::FONT_LIST_SEPARATOR) {
                    return Err(ConfigError::Validation(format!(
                        "{field} entry '{font}' contains a comma and can never be requested"
                    )));
                }
            }
        }

        Ok(())
    }
}
