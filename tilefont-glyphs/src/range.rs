//! Glyph range identifiers (`"<start>-<end>"`).

use std::fmt;
use std::str::FromStr;

use crate::error::GlyphError;

/// Number of code points covered by one glyph range.
pub const RANGE_SIZE: u32 = 256;

/// Highest code point a glyph range may end on (the Basic Multilingual Plane).
pub const MAX_CODE_POINT: u32 = 0xFFFF;

/// A 256-code-point block such as `0-255` or `256-511`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlyphRange {
    start: u32,
}

impl GlyphRange {
    /// Range containing the given code point.
    pub fn containing(code_point: u32) -> Option<Self> {
        (code_point <= MAX_CODE_POINT).then(|| GlyphRange {
            start: code_point - code_point % RANGE_SIZE,
        })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.start + RANGE_SIZE - 1
    }
}

impl fmt::Display for GlyphRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start(), self.end())
    }
}

impl FromStr for GlyphRange {
    type Err = GlyphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GlyphError::InvalidRange(s.to_string());

        let (start, end) = s.split_once('-').ok_or_else(invalid)?;
        if start.is_empty()
            || end.is_empty()
            || !start.bytes().all(|b| b.is_ascii_digit())
            || !end.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        let start: u32 = start.parse().map_err(|_| invalid())?;
        let end: u32 = end.parse().map_err(|_| invalid())?;

        if start % RANGE_SIZE != 0 || end != start + RANGE_SIZE - 1 || end > MAX_CODE_POINT {
            return Err(invalid());
        }
        Ok(GlyphRange { start })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_ranges() {
        let range: GlyphRange = "0-255".parse().unwrap();
        assert_eq!(range.start(), 0);
        assert_eq!(range.end(), 255);

        let range: GlyphRange = "65280-65535".parse().unwrap();
        assert_eq!(range.to_string(), "65280-65535");
    }

    #[test]
    fn test_parse_rejects_misaligned_or_malformed() {
        for bad in [
            "", "0", "0-", "-255", "1-256", "0-256", "256-255", "a-b", "0-255.pbf", "+0-255",
            "65536-65791", "../0-255",
        ] {
            assert!(
                bad.parse::<GlyphRange>().is_err(),
                "'{bad}' should be rejected"
            );
        }
    }

    #[test]
    fn test_containing() {
        assert_eq!(GlyphRange::containing(0x41).unwrap().to_string(), "0-255");
        assert_eq!(
            GlyphRange::containing(0x4E2D).unwrap().to_string(),
            "19968-20223"
        );
        assert!(GlyphRange::containing(0x1F600).is_none());
    }
}
