//! Single-font glyph resolution with allow-list admission and fallback.

use std::path::Path;

use crate::error::GlyphError;
use crate::fallbacks::fallback_font_name;
use crate::font_set::FontSet;
use crate::range::GlyphRange;
use crate::storage::GlyphStore;

/// Resolve the glyph buffer for one font and range.
///
/// # Arguments
/// * `store` - Backing glyph store
/// * `allow_list` - Fonts the deployment may serve; `None` or empty means unrestricted
/// * `base` - Root of the glyph resources in `store`
/// * `font` - Requested font family name (case-sensitive)
/// * `range` - Glyph range to load
/// * `fallbacks` - Candidates to substitute from; defaults to a copy of `allow_list`
///
/// A restricted request is only admitted when `font` is allowed and a
/// non-empty candidate set was supplied. Each attempted name is removed from
/// the candidate set before its read, so a chain never tries a name twice
/// and performs at most `fallbacks.len() + 1` reads.
///
/// # Errors
/// * [`GlyphError::FontNotAllowed`] if admission fails
/// * [`GlyphError::FontLoad`] naming the last attempted font once the
///   candidate set is exhausted
pub async fn resolve<S: GlyphStore>(
    store: &S,
    allow_list: Option<&FontSet>,
    base: &Path,
    font: &str,
    range: GlyphRange,
    fallbacks: Option<FontSet>,
) -> Result<Vec<u8>, GlyphError> {
    let restricted = allow_list.filter(|allowed| !allowed.is_empty());
    if let Some(allowed) = restricted {
        let has_candidates = fallbacks.as_ref().is_some_and(|f| !f.is_empty());
        if !allowed.contains(font) || !has_candidates {
            return Err(GlyphError::FontNotAllowed {
                font: font.to_string(),
            });
        }
    }

    let mut candidates = fallbacks
        .or_else(|| allow_list.cloned())
        .unwrap_or_default();
    let mut current = font.to_string();

    loop {
        candidates.remove(&current);

        match store.read(base, &current, range).await {
            Ok(data) => return Ok(data),
            Err(e) => {
                log::error!("Font not found: {} ({})", current, e);

                let Some(substitute) = fallback_font_name(&current, &candidates) else {
                    return Err(GlyphError::FontLoad { font: current });
                };

                log::warn!(
                    "Trying to use '{}' as a fallback for '{}' ({})",
                    substitute,
                    current,
                    range
                );
                current = substitute;
            }
        }
    }
}
