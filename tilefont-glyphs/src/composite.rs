//! Glyph PBF decoding, encoding and composition.
//!
//! Glyph ranges are protobuf messages of the form:
//!
//! ```text
//! message glyph     { uint32 id = 1; bytes bitmap = 2; uint32 width = 3; uint32 height = 4;
//!                     sint32 left = 5; sint32 top = 6; uint32 advance = 7; }
//! message fontstack { string name = 1; string range = 2; repeated glyph glyphs = 3; }
//! message glyphs    { repeated fontstack stacks = 1; }
//! ```
//!
//! Composition merges several single-font buffers into one fontstack where
//! earlier fonts take precedence per code point.

use std::collections::HashSet;

use crate::error::GlyphError;

/// Separator between font names in a composed fontstack name.
pub const FONTSTACK_SEPARATOR: &str = ", ";

const WIRE_VARINT: u8 = 0;
const WIRE_FIXED64: u8 = 1;
const WIRE_LEN: u8 = 2;
const WIRE_FIXED32: u8 = 5;

/// One rendered glyph (SDF bitmap plus metrics).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Glyph {
    pub id: u32,
    pub bitmap: Option<Vec<u8>>,
    pub width: u32,
    pub height: u32,
    pub left: i32,
    pub top: i32,
    pub advance: u32,
}

/// Glyphs of one font stack for one range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fontstack {
    pub name: String,
    pub range: String,
    pub glyphs: Vec<Glyph>,
}

/// Top-level glyph PBF message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphSet {
    pub stacks: Vec<Fontstack>,
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// Merge per-font glyph buffers into one, in the given order.
///
/// The first buffer that carries a fontstack is the base. Glyphs from later
/// buffers are added only for code points the result does not cover yet, the
/// stack names are joined with [`FONTSTACK_SEPARATOR`] and the glyphs are
/// sorted by id. `fontstack_name` overrides the joined name.
///
/// A single buffer without a name override is returned unchanged; no buffers
/// yield an empty buffer.
pub fn combine<B: AsRef<[u8]>>(
    buffers: &[B],
    fontstack_name: Option<&str>,
) -> Result<Vec<u8>, GlyphError> {
    match buffers {
        [] => return Ok(Vec::new()),
        [only] if fontstack_name.is_none() => return Ok(only.as_ref().to_vec()),
        _ => {}
    }

    let mut result: Option<Fontstack> = None;
    let mut coverage: HashSet<u32> = HashSet::new();

    for buffer in buffers {
        let decoded = decode(buffer.as_ref())?;
        let Some(stack) = decoded.stacks.into_iter().next() else {
            continue;
        };

        match result.as_mut() {
            None => {
                coverage.extend(stack.glyphs.iter().map(|g| g.id));
                result = Some(stack);
            }
            Some(merged) => {
                for glyph in stack.glyphs {
                    if coverage.insert(glyph.id) {
                        merged.glyphs.push(glyph);
                    }
                }
                merged.name.push_str(FONTSTACK_SEPARATOR);
                merged.name.push_str(&stack.name);
            }
        }
    }

    let mut set = GlyphSet::default();
    if let Some(mut stack) = result {
        if let Some(name) = fontstack_name {
            stack.name = name.to_string();
        }
        stack.glyphs.sort_by_key(|g| g.id);
        set.stacks.push(stack);
    }
    Ok(encode(&set))
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a glyph PBF buffer. Unknown fields are skipped.
pub fn decode(buf: &[u8]) -> Result<GlyphSet, GlyphError> {
    let mut set = GlyphSet::default();
    let mut reader = Reader::new(buf);
    while let Some((field, wire)) = reader.key()? {
        match (field, wire) {
            (1, WIRE_LEN) => set.stacks.push(decode_fontstack(reader.bytes()?)?),
            _ => reader.skip(wire)?,
        }
    }
    Ok(set)
}

fn decode_fontstack(buf: &[u8]) -> Result<Fontstack, GlyphError> {
    let mut stack = Fontstack::default();
    let mut reader = Reader::new(buf);
    while let Some((field, wire)) = reader.key()? {
        match (field, wire) {
            (1, WIRE_LEN) => stack.name = reader.string()?,
            (2, WIRE_LEN) => stack.range = reader.string()?,
            (3, WIRE_LEN) => stack.glyphs.push(decode_glyph(reader.bytes()?)?),
            _ => reader.skip(wire)?,
        }
    }
    Ok(stack)
}

fn decode_glyph(buf: &[u8]) -> Result<Glyph, GlyphError> {
    let mut glyph = Glyph::default();
    let mut reader = Reader::new(buf);
    while let Some((field, wire)) = reader.key()? {
        match (field, wire) {
            (1, WIRE_VARINT) => glyph.id = reader.varint()? as u32,
            (2, WIRE_LEN) => glyph.bitmap = Some(reader.bytes()?.to_vec()),
            (3, WIRE_VARINT) => glyph.width = reader.varint()? as u32,
            (4, WIRE_VARINT) => glyph.height = reader.varint()? as u32,
            (5, WIRE_VARINT) => glyph.left = zigzag_decode(reader.varint()?),
            (6, WIRE_VARINT) => glyph.top = zigzag_decode(reader.varint()?),
            (7, WIRE_VARINT) => glyph.advance = reader.varint()? as u32,
            _ => reader.skip(wire)?,
        }
    }
    Ok(glyph)
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Reader { buf, pos: 0 }
    }

    /// Next field key, or `None` at the end of the message.
    fn key(&mut self) -> Result<Option<(u64, u8)>, GlyphError> {
        if self.pos >= self.buf.len() {
            return Ok(None);
        }
        let key = self.varint()?;
        let field = key >> 3;
        if field == 0 {
            return Err(GlyphError::malformed("field number 0"));
        }
        Ok(Some((field, (key & 0x7) as u8)))
    }

    fn varint(&mut self) -> Result<u64, GlyphError> {
        let mut result: u64 = 0;
        let mut shift = 0;
        loop {
            let byte = *self
                .buf
                .get(self.pos)
                .ok_or_else(|| GlyphError::malformed("truncated varint"))?;
            self.pos += 1;
            if shift >= 64 {
                return Err(GlyphError::malformed("varint too long"));
            }
            result |= ((byte & 0x7F) as u64) << shift;
            shift += 7;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], GlyphError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.buf.len())
            .ok_or_else(|| GlyphError::malformed("truncated field"))?;
        let buf: &'a [u8] = self.buf;
        let slice = &buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn bytes(&mut self) -> Result<&'a [u8], GlyphError> {
        let len = usize::try_from(self.varint()?)
            .map_err(|_| GlyphError::malformed("field length overflow"))?;
        self.take(len)
    }

    fn string(&mut self) -> Result<String, GlyphError> {
        let bytes = self.bytes()?;
        String::from_utf8(bytes.to_vec()).map_err(|_| GlyphError::malformed("invalid UTF-8"))
    }

    fn skip(&mut self, wire: u8) -> Result<(), GlyphError> {
        match wire {
            WIRE_VARINT => self.varint().map(|_| ()),
            WIRE_FIXED64 => self.take(8).map(|_| ()),
            WIRE_LEN => self.bytes().map(|_| ()),
            WIRE_FIXED32 => self.take(4).map(|_| ()),
            other => Err(GlyphError::malformed(format!("unsupported wire type {other}"))),
        }
    }
}

fn zigzag_decode(value: u64) -> i32 {
    ((value >> 1) as i64 ^ -((value & 1) as i64)) as i32
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode a glyph set as PBF.
pub fn encode(set: &GlyphSet) -> Vec<u8> {
    let mut buf = Vec::new();
    for stack in &set.stacks {
        let mut stack_buf = Vec::new();
        write_bytes_field(&mut stack_buf, 1, stack.name.as_bytes());
        write_bytes_field(&mut stack_buf, 2, stack.range.as_bytes());
        for glyph in &stack.glyphs {
            write_bytes_field(&mut stack_buf, 3, &encode_glyph(glyph));
        }
        write_bytes_field(&mut buf, 1, &stack_buf);
    }
    buf
}

fn encode_glyph(glyph: &Glyph) -> Vec<u8> {
    let mut buf = Vec::new();
    write_varint_field(&mut buf, 1, glyph.id as u64);
    if let Some(bitmap) = &glyph.bitmap {
        write_bytes_field(&mut buf, 2, bitmap);
    }
    write_varint_field(&mut buf, 3, glyph.width as u64);
    write_varint_field(&mut buf, 4, glyph.height as u64);
    write_varint_field(&mut buf, 5, zigzag_encode(glyph.left));
    write_varint_field(&mut buf, 6, zigzag_encode(glyph.top));
    write_varint_field(&mut buf, 7, glyph.advance as u64);
    buf
}

fn write_varint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

fn write_key(buf: &mut Vec<u8>, field: u64, wire: u8) {
    write_varint(buf, (field << 3) | wire as u64);
}

fn write_varint_field(buf: &mut Vec<u8>, field: u64, value: u64) {
    write_key(buf, field, WIRE_VARINT);
    write_varint(buf, value);
}

fn write_bytes_field(buf: &mut Vec<u8>, field: u64, data: &[u8]) {
    write_key(buf, field, WIRE_LEN);
    write_varint(buf, data.len() as u64);
    buf.extend_from_slice(data);
}

fn zigzag_encode(value: i32) -> u64 {
    ((value << 1) ^ (value >> 31)) as u32 as u64
}
