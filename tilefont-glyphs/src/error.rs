//! Typed error types for tilefont-glyphs.
//!
//! Every failure inside one font's resolution chain surfaces as a
//! [`GlyphError`], and any single failure fails the whole composed request.
//! The HTTP layer maps these onto response status codes.

use thiserror::Error;

/// Errors produced while resolving or composing glyph ranges.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GlyphError {
    // -----------------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------------
    /// The requested font is not in the configured allow-list.
    #[error("Font not allowed: {font}")]
    FontNotAllowed {
        /// Font family name as requested.
        font: String,
    },

    /// The font and every fallback candidate failed to load.
    ///
    /// `font` names the last font attempted in the chain.
    #[error("Font load error: {font}")]
    FontLoad {
        /// Last font name attempted before the candidate set ran out.
        font: String,
    },

    /// The glyph range identifier is not a valid 256-code-point block.
    #[error("Invalid glyph range: {0}")]
    InvalidRange(String),

    // -----------------------------------------------------------------------
    // Composition
    // -----------------------------------------------------------------------
    /// A glyph buffer could not be decoded as a glyph PBF.
    #[error("Malformed glyph data: {reason}")]
    MalformedGlyphs {
        /// What the decoder tripped over.
        reason: String,
    },

    /// A per-font resolution task panicked or was cancelled.
    #[error("Glyph task failed: {0}")]
    Task(String),
}

impl GlyphError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        GlyphError::MalformedGlyphs {
            reason: reason.into(),
        }
    }
}

impl From<tokio::task::JoinError> for GlyphError {
    fn from(e: tokio::task::JoinError) -> Self {
        GlyphError::Task(e.to_string())
    }
}
