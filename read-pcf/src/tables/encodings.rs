//! The BDF_ENCODINGS table
//!
//! Maps code points to glyph indices through a dense two-dimensional array
//! indexed by the high byte (`byte1`) and low byte (`byte2`) of the code
//! point. Fonts with a single-byte encoding have `min_byte1 == max_byte1 == 0`.

use std::io::{Read, Seek};

use crate::directory::{TableEntry, TableKind};
use crate::font_data::Cursor;
use crate::format::PCF_DEFAULT_FORMAT;
use crate::read::{FormatError, ReadError};
use crate::GlyphId;

/// The glyph index stored for code points without a glyph.
pub const NO_GLYPH: u16 = 0xFFFF;

/// A fully loaded encoding table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodingTable {
    min_byte2: u8,
    max_byte2: u8,
    min_byte1: u8,
    max_byte1: u8,
    default_char: u16,
    indices: Vec<u16>,
}

impl EncodingTable {
    pub fn read<R: Read + Seek>(source: &mut R, entry: &TableEntry) -> Result<Self, ReadError> {
        let (mut cursor, format) = Cursor::for_table(source, entry)?;
        format.expect_variant(&[PCF_DEFAULT_FORMAT])?;
        let min_byte2 = read_byte_bound(&mut cursor)?;
        let max_byte2 = read_byte_bound(&mut cursor)?;
        let min_byte1 = read_byte_bound(&mut cursor)?;
        let max_byte1 = read_byte_bound(&mut cursor)?;
        let default_char = cursor.read_u16()?;
        if min_byte2 > max_byte2 || min_byte1 > max_byte1 {
            return Err(FormatError::Malformed {
                kind: TableKind::BdfEncodings,
                reason: "inverted byte range",
            }
            .into());
        }
        let count = (max_byte2 - min_byte2) as usize + 1;
        let count = count * ((max_byte1 - min_byte1) as usize + 1);
        cursor.ensure(count as u64 * 2)?;
        let indices = (0..count)
            .map(|_| cursor.read_u16())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(EncodingTable {
            min_byte2,
            max_byte2,
            min_byte1,
            max_byte1,
            default_char,
            indices,
        })
    }

    /// Map a code point to a glyph.
    ///
    /// Code points outside the encoded ranges fall back to the default
    /// character. A code point inside the ranges that has no glyph maps to
    /// `None`, as does a default character that itself has no glyph.
    pub fn resolve(&self, code_point: u32) -> Option<GlyphId> {
        match self.lookup(code_point) {
            Some(index) => (index != NO_GLYPH).then_some(GlyphId::new(index)),
            None => self
                .lookup(self.default_char as u32)
                .filter(|index| *index != NO_GLYPH)
                .map(GlyphId::new),
        }
    }

    /// The raw index stored for `code_point`, or `None` when it lies outside
    /// the encoded ranges.
    fn lookup(&self, code_point: u32) -> Option<u16> {
        if code_point > 0xFFFF {
            return None;
        }
        let byte1 = (code_point >> 8) as u8;
        let byte2 = code_point as u8;
        if !(self.min_byte1..=self.max_byte1).contains(&byte1)
            || !(self.min_byte2..=self.max_byte2).contains(&byte2)
        {
            return None;
        }
        let index = (byte1 - self.min_byte1) as usize * self.columns()
            + (byte2 - self.min_byte2) as usize;
        self.indices.get(index).copied()
    }

    fn columns(&self) -> usize {
        (self.max_byte2 - self.min_byte2) as usize + 1
    }

    /// Iterate over every mapped `(code point, glyph)` pair in code point
    /// order.
    pub fn mappings(&self) -> impl Iterator<Item = (u32, GlyphId)> + '_ {
        let columns = self.columns();
        self.indices
            .iter()
            .enumerate()
            .filter(|(_, index)| **index != NO_GLYPH)
            .map(move |(i, index)| {
                let byte1 = self.min_byte1 as u32 + (i / columns) as u32;
                let byte2 = self.min_byte2 as u32 + (i % columns) as u32;
                ((byte1 << 8) | byte2, GlyphId::new(*index))
            })
    }

    pub fn default_char(&self) -> u16 {
        self.default_char
    }

    /// The inclusive range of the low byte.
    pub fn byte2_range(&self) -> (u8, u8) {
        (self.min_byte2, self.max_byte2)
    }

    /// The inclusive range of the high byte.
    pub fn byte1_range(&self) -> (u8, u8) {
        (self.min_byte1, self.max_byte1)
    }

    pub fn is_single_byte(&self) -> bool {
        self.min_byte1 == 0 && self.max_byte1 == 0
    }
}

fn read_byte_bound<R: Read + Seek>(cursor: &mut Cursor<R>) -> Result<u8, ReadError> {
    let value = cursor.read_u16()?;
    u8::try_from(value).map_err(|_| {
        FormatError::Malformed {
            kind: TableKind::BdfEncodings,
            reason: "byte range bound above 0xFF",
        }
        .into()
    })
}
