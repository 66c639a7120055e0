//! Font fallback substitution.
//!
//! Picks a substitute for a font whose glyph range could not be loaded,
//! keeping the style (weight/slant suffix) of the missing font where possible.

use crate::font_set::FontSet;

/// Style suffixes recognised on font family names.
pub const KNOWN_STYLES: &[&str] = &["Regular", "Bold", "Italic"];

/// Style assumed when the failed name carries no recognised suffix.
pub const DEFAULT_STYLE: &str = "Regular";

/// Preferred substitute families, in priority order.
///
/// Each is combined with the style of the missing font, e.g. a missing
/// `"Arial Bold"` is replaced by `"Noto Sans Bold"` when that is available.
pub const PREFERRED_FAMILIES: &[&str] = &["Noto Sans", "Open Sans"];

/// Style of a font name: its last space-delimited token if recognised,
/// otherwise [`DEFAULT_STYLE`].
pub fn font_style(name: &str) -> &'static str {
    let last = name.rsplit(' ').next().unwrap_or_default();
    KNOWN_STYLES
        .iter()
        .copied()
        .find(|style| *style == last)
        .unwrap_or(DEFAULT_STYLE)
}

/// Choose the next font to try after `failed` could not be loaded.
///
/// Tries each of [`PREFERRED_FAMILIES`] with the failed font's style, then
/// falls back to the first remaining candidate in insertion order. Returns
/// `None` only when `candidates` is empty.
pub fn fallback_font_name(failed: &str, candidates: &FontSet) -> Option<String> {
    let style = font_style(failed);

    PREFERRED_FAMILIES
        .iter()
        .map(|family| format!("{family} {style}"))
        .find(|name| candidates.contains(name))
        .or_else(|| candidates.first().map(str::to_string))
}
