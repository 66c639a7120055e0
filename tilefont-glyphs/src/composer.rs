//! Multi-font glyph composition.
//!
//! Splits a comma-delimited font list, resolves every font concurrently and
//! merges the results in request order.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::composite;
use crate::error::GlyphError;
use crate::font_set::FontSet;
use crate::range::GlyphRange;
use crate::resolver::resolve;
use crate::storage::GlyphStore;

/// Separator between font names in a requested font list.
pub const FONT_LIST_SEPARATOR: char = ',';

/// Split a requested font list into names, keeping order and duplicates.
pub fn split_font_list(font_list: &str) -> Vec<String> {
    font_list
        .split(FONT_LIST_SEPARATOR)
        .map(str::to_string)
        .collect()
}

/// Resolve and merge the glyphs of every font in `font_list` for `range`.
///
/// # Arguments
/// * `store` - Backing glyph store, shared with the per-font tasks
/// * `allow_list` - Fonts the deployment may serve; `None` or empty means unrestricted
/// * `base` - Root of the glyph resources in `store`
/// * `font_list` - Comma-delimited font names, in precedence order
/// * `range` - Glyph range to load
/// * `default_fallbacks` - Substitution candidates when no allow-list governs the request
///
/// Each font gets its own copy of the candidate set, so one font's fallback
/// chain never changes another's. Resolutions run as concurrent tasks; the
/// first failure aborts the rest and fails the whole call. Dropping the
/// returned future aborts every task still in flight.
pub async fn compose_fonts<S: GlyphStore>(
    store: Arc<S>,
    allow_list: Option<&FontSet>,
    base: impl Into<PathBuf>,
    font_list: &str,
    range: GlyphRange,
    default_fallbacks: Option<&FontSet>,
) -> Result<Vec<u8>, GlyphError> {
    let base: Arc<PathBuf> = Arc::new(base.into());
    let fonts = split_font_list(font_list);
    let allow_list: Option<Arc<FontSet>> = allow_list
        .filter(|allowed| !allowed.is_empty())
        .map(|allowed| Arc::new(allowed.clone()));
    let candidates = allow_list
        .as_deref()
        .or(default_fallbacks)
        .cloned()
        .unwrap_or_default();

    let mut tasks: JoinSet<(usize, Result<Vec<u8>, GlyphError>)> = JoinSet::new();
    for (index, font) in fonts.iter().enumerate() {
        let store = Arc::clone(&store);
        let base = Arc::clone(&base);
        let allow_list = allow_list.clone();
        let fallbacks = candidates.clone();
        let font = font.clone();
        tasks.spawn(async move {
            let result = resolve(
                store.as_ref(),
                allow_list.as_deref(),
                &base,
                &font,
                range,
                Some(fallbacks),
            )
            .await;
            (index, result)
        });
    }

    let mut buffers: Vec<Option<Vec<u8>>> = vec![None; fonts.len()];
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined?;
        match result {
            Ok(data) => buffers[index] = Some(data),
            Err(e) => {
                log::debug!("Aborting glyph composition for '{}': {}", font_list, e);
                tasks.abort_all();
                return Err(e);
            }
        }
    }

    let buffers: Vec<Vec<u8>> = buffers
        .into_iter()
        .map(|buffer| buffer.ok_or_else(|| GlyphError::Task("missing glyph buffer".into())))
        .collect::<Result<_, _>>()?;

    composite::combine(&buffers, None)
}
