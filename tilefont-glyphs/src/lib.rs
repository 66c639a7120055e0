//! Font glyph resolution and composition for the tilefont map server.
//!
//! This crate provides:
//! - Glyph range lookup against a pluggable read-only store (disk or memory)
//! - Allow-list admission and a style-preserving fallback chain for missing fonts
//! - Concurrent per-font resolution merged into one glyph PBF
//!
//! # Architecture
//!
//! [`compose_fonts`] splits a font list such as
//! `"Open Sans Regular,Arial Unicode MS Regular"` and runs [`resolve`] for each
//! name as its own task. Each resolution owns a copy of the fallback
//! candidate set and walks it until a font loads or the set runs out:
//! 1. The requested font
//! 2. `Noto Sans <style>`, then `Open Sans <style>`
//! 3. The first remaining candidate, in allow-list order
//!
//! The per-font buffers are then merged by [`composite::combine`] in request
//! order.

pub mod composer;
pub mod composite;
pub mod error;
pub mod fallbacks;
pub mod font_set;
pub mod range;
pub mod resolver;
pub mod storage;

// Re-export main types for convenience
pub use composer::{compose_fonts, split_font_list};
pub use error::GlyphError;
pub use fallbacks::fallback_font_name;
pub use font_set::FontSet;
pub use range::GlyphRange;
pub use resolver::resolve;
pub use storage::{FsGlyphStore, GlyphStore, MemoryGlyphStore};
