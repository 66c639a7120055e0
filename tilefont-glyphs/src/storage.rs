//! Glyph resource storage backends.
//!
//! A store maps `(base path, font name, glyph range)` to the raw bytes of one
//! glyph PBF. Stores are read-only from the resolver's point of view, so any
//! number of concurrent reads is safe.

use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use parking_lot::Mutex;

use crate::range::GlyphRange;

/// File extension of glyph range files on disk.
pub const GLYPH_FILE_EXTENSION: &str = "pbf";

/// Read-only provider of glyph range buffers.
pub trait GlyphStore: Send + Sync + 'static {
    /// Read the glyph buffer for `font` and `range` under `base`.
    ///
    /// Any error (not found, permission, I/O) is treated by the resolver as
    /// "this font is unavailable" and triggers fallback.
    fn read(
        &self,
        base: &Path,
        font: &str,
        range: GlyphRange,
    ) -> impl Future<Output = io::Result<Vec<u8>>> + Send;
}

// ---------------------------------------------------------------------------
// File system
// ---------------------------------------------------------------------------

/// Glyph store laid out as `<base>/<font name>/<start>-<end>.pbf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsGlyphStore;

impl FsGlyphStore {
    pub fn new() -> Self {
        FsGlyphStore
    }

    /// Path of the glyph file for `font`/`range`, or an `InvalidInput` error
    /// when the font name would not resolve to a single directory under `base`.
    pub fn glyph_path(base: &Path, font: &str, range: GlyphRange) -> io::Result<PathBuf> {
        validate_font_name(font)?;
        Ok(base
            .join(font)
            .join(format!("{range}.{GLYPH_FILE_EXTENSION}")))
    }

    /// Font families available under `base`: the names of its subdirectories,
    /// sorted.
    pub async fn list_fonts(base: &Path) -> io::Result<Vec<String>> {
        let mut fonts = Vec::new();
        let mut entries = tokio::fs::read_dir(base).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => fonts.push(name),
                Err(name) => log::warn!("Skipping non UTF-8 font directory: {:?}", name),
            }
        }
        fonts.sort();
        Ok(fonts)
    }
}

impl GlyphStore for FsGlyphStore {
    async fn read(&self, base: &Path, font: &str, range: GlyphRange) -> io::Result<Vec<u8>> {
        let path = Self::glyph_path(base, font, range)?;
        log::trace!("Reading glyphs from {}", path.display());
        tokio::fs::read(&path).await
    }
}

/// Reject font names that are empty or would step outside the font base
/// directory (separators, `.`/`..`, absolute paths).
fn validate_font_name(font: &str) -> io::Result<()> {
    let mut components = Path::new(font).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single_normal || font.contains(['/', '\\', '\0']) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid font name '{font}'"),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

type MemoryKey = (PathBuf, String, GlyphRange);

/// In-memory glyph bundle.
///
/// Records every font name it is asked for, in request order, and can delay
/// reads per font, which makes it useful for exercising resolution order and
/// concurrency.
#[derive(Debug, Default)]
pub struct MemoryGlyphStore {
    entries: HashMap<MemoryKey, Vec<u8>>,
    delays: HashMap<String, Duration>,
    reads: Mutex<Vec<String>>,
}

impl MemoryGlyphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a glyph buffer.
    pub fn insert(
        &mut self,
        base: impl Into<PathBuf>,
        font: impl Into<String>,
        range: GlyphRange,
        data: Vec<u8>,
    ) {
        self.entries
            .insert((base.into(), font.into(), range), data);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_glyphs(
        mut self,
        base: impl Into<PathBuf>,
        font: impl Into<String>,
        range: GlyphRange,
        data: Vec<u8>,
    ) -> Self {
        self.insert(base, font, range, data);
        self
    }

    /// Delay every read of `font` by `delay`.
    pub fn with_delay(mut self, font: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(font.into(), delay);
        self
    }

    /// Font names read so far, in the order the reads started.
    pub fn reads(&self) -> Vec<String> {
        self.reads.lock().clone()
    }
}

impl GlyphStore for MemoryGlyphStore {
    async fn read(&self, base: &Path, font: &str, range: GlyphRange) -> io::Result<Vec<u8>> {
        self.reads.lock().push(font.to_string());

        if let Some(delay) = self.delays.get(font) {
            tokio::time::sleep(*delay).await;
        }

        self.entries
            .get(&(base.to_path_buf(), font.to_string(), range))
            .cloned()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no glyphs for '{font}' {range}"),
                )
            })
    }
}
