//! Serving state derived from one loaded configuration.
//!
//! A `ServingState` is immutable. Reloads build a fresh one and swap it in,
//! so requests already running keep the state they started with.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tilefont_config::Config;
use tilefont_glyphs::{FontSet, FsGlyphStore, GlyphError, GlyphRange, compose_fonts};

/// Why a glyph request produced no PBF.
#[derive(Debug, thiserror::Error)]
pub enum ComposeFailure {
    #[error(transparent)]
    Glyph(#[from] GlyphError),
    #[error("Glyph request timed out after {0:?}")]
    Timeout(Duration),
}

/// Everything a glyph request needs, resolved from a [`Config`].
#[derive(Debug)]
pub struct ServingState {
    pub config: Config,
    /// Base directory of all glyph ranges.
    pub fonts_dir: PathBuf,
    /// Admission list; `None` serves any font.
    pub allow_list: Option<FontSet>,
    /// Substitution candidates when no allow-list applies.
    pub default_fallbacks: FontSet,
    /// Font directories found at load time, sorted.
    pub available_fonts: Vec<String>,
    pub timeout: Duration,
    store: Arc<FsGlyphStore>,
}

impl ServingState {
    /// Load the config at `path` and build a serving state from it.
    pub async fn load(path: &Path) -> Result<Self> {
        let config = Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?;
        Self::from_config(config).await
    }

    /// Build a serving state from an already parsed config.
    ///
    /// # Errors
    /// Fails when the fonts directory is missing or cannot be listed.
    pub async fn from_config(config: Config) -> Result<Self> {
        config.check_paths()?;
        let fonts_dir = config.fonts_dir();
        let available_fonts = FsGlyphStore::list_fonts(&fonts_dir)
            .await
            .with_context(|| format!("Failed to list fonts in {}", fonts_dir.display()))?;

        let allow_list = config.font_allow_list();
        let default_fallbacks = config
            .configured_fallbacks()
            .unwrap_or_else(|| available_fonts.iter().map(String::as_str).collect());

        if let Some(allowed) = &allow_list {
            for font in allowed.iter() {
                if !available_fonts.iter().any(|f| f == font) {
                    log::warn!("Allowed font '{}' has no directory in {}", font, fonts_dir.display());
                }
            }
        }

        log::info!(
            "Serving glyphs from {} ({} fonts found, {})",
            fonts_dir.display(),
            available_fonts.len(),
            match &allow_list {
                Some(allowed) => format!("{} allowed", allowed.len()),
                None => "all allowed".to_string(),
            }
        );

        Ok(Self {
            timeout: config.font_request_timeout(),
            config,
            fonts_dir,
            allow_list,
            default_fallbacks,
            available_fonts,
            store: Arc::new(FsGlyphStore::new()),
        })
    }

    /// Fonts advertised by `/fonts.json`: the allow-list when one is set,
    /// otherwise every font directory.
    pub fn listed_fonts(&self) -> Vec<String> {
        match &self.allow_list {
            Some(allowed) => allowed.iter().map(str::to_string).collect(),
            None => self.available_fonts.clone(),
        }
    }

    /// Compose the glyph PBF for a comma-delimited font list, bounded by the
    /// configured request timeout. Timing out drops (and so aborts) every
    /// pending font read.
    pub async fn compose(
        &self,
        font_list: &str,
        range: GlyphRange,
    ) -> Result<Vec<u8>, ComposeFailure> {
        let compose = compose_fonts(
            Arc::clone(&self.store),
            self.allow_list.as_ref(),
            self.fonts_dir.clone(),
            font_list,
            range,
            Some(&self.default_fallbacks),
        );
        match tokio::time::timeout(self.timeout, compose).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ComposeFailure::Timeout(self.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &Path, json: &str) -> PathBuf {
        let path = dir.join("config.json");
        fs::write(&path, json).expect("Failed to write config");
        path
    }

    #[tokio::test]
    async fn test_default_fallbacks_are_font_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(temp_dir.path().join("fonts/Open Sans Bold")).unwrap();
        fs::create_dir_all(temp_dir.path().join("fonts/Noto Sans Regular")).unwrap();
        let path = write_config(temp_dir.path(), r#"{"options": {"paths": {"fonts": "fonts"}}}"#);

        let state = ServingState::load(&path).await.expect("state should load");
        assert!(state.allow_list.is_none());
        assert_eq!(state.available_fonts, vec!["Noto Sans Regular", "Open Sans Bold"]);
        assert_eq!(
            state.default_fallbacks.iter().collect::<Vec<_>>(),
            vec!["Noto Sans Regular", "Open Sans Bold"]
        );
        assert_eq!(state.listed_fonts(), state.available_fonts);
    }

    #[tokio::test]
    async fn test_configured_fallbacks_and_allow_list() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(temp_dir.path().join("Open Sans Regular")).unwrap();
        let path = write_config(
            temp_dir.path(),
            r#"{"options": {
                "allowedFonts": ["Open Sans Regular"],
                "fallbackFonts": ["Open Sans Regular"],
                "fontRequestTimeoutMs": 1500
            }}"#,
        );

        let state = ServingState::load(&path).await.expect("state should load");
        assert_eq!(state.listed_fonts(), vec!["Open Sans Regular"]);
        assert_eq!(state.default_fallbacks.len(), 1);
        assert_eq!(state.timeout, Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_missing_fonts_dir_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = write_config(temp_dir.path(), r#"{"options": {"paths": {"fonts": "nope"}}}"#);

        let err = ServingState::load(&path).await.unwrap_err();
        assert!(format!("{err:#}").contains("\"fonts\" does not exist"));
    }

    #[tokio::test]
    async fn test_compose_reports_glyph_errors() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(temp_dir.path().join("Open Sans Regular")).unwrap();
        let path = write_config(
            temp_dir.path(),
            r#"{"options": {"allowedFonts": ["Open Sans Regular"]}}"#,
        );
        let state = ServingState::load(&path).await.unwrap();

        let err = state
            .compose("Comic Sans Regular", GlyphRange::containing(0).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ComposeFailure::Glyph(GlyphError::FontNotAllowed { ref font }) if font == "Comic Sans Regular"
        ));
    }
}
