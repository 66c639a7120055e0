//! Font serving policy derived from `Config`.

use super::config_struct::Config;
use std::time::Duration;
use tilefont_glyphs::FontSet;

impl Config {
    /// Fonts the server may serve, or `None` when any font is allowed
    /// (`serveAllFonts`, or no/empty `allowedFonts`).
    pub fn font_allow_list(&self) -> Option<FontSet> {
        if self.options.serve_all_fonts {
            return None;
        }
        self.options
            .allowed_fonts
            .as_ref()
            .filter(|fonts| !fonts.is_empty())
            .map(|fonts| fonts.iter().map(String::as_str).collect())
    }

    /// Explicitly configured fallback candidates for unrestricted requests.
    pub fn configured_fallbacks(&self) -> Option<FontSet> {
        self.options
            .fallback_fonts
            .as_ref()
            .map(|fonts| fonts.iter().map(String::as_str).collect())
    }

    pub fn font_request_timeout(&self) -> Duration {
        Duration::from_millis(self.options.font_request_timeout_ms)
    }
}
