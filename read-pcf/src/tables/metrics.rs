//! The METRICS and INK_METRICS tables
//!
//! Both tables share one layout and are indexed by the same glyph ids.

use std::io::{Read, Seek};

use crate::directory::{TableEntry, TableKind};
use crate::font_data::Cursor;
use crate::format::{FormatInfo, PCF_COMPRESSED_METRICS, PCF_DEFAULT_FORMAT};
use crate::read::{per_record, FormatError, ReadError};
use crate::GlyphId;

const COMPRESSED_RECORD_LEN: u64 = 5;
const RECORD_LEN: u64 = 12;
const COMPRESSED_BIAS: i16 = 0x80;

/// Metrics for a single glyph, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlyphMetrics {
    pub left_side_bearing: i16,
    pub right_side_bearing: i16,
    /// Horizontal advance.
    pub character_width: i16,
    pub ascent: i16,
    pub descent: i16,
    /// Always zero in compressed tables.
    pub attributes: u16,
}

impl GlyphMetrics {
    /// Width of the glyph bitmap in pixels.
    pub fn width(&self) -> u16 {
        (self.right_side_bearing as i32 - self.left_side_bearing as i32).max(0) as u16
    }

    /// Height of the glyph bitmap in pixels.
    pub fn height(&self) -> u16 {
        (self.ascent as i32 + self.descent as i32).max(0) as u16
    }

    pub(crate) fn read<R: Read + Seek>(cursor: &mut Cursor<R>) -> Result<Self, ReadError> {
        Ok(GlyphMetrics {
            left_side_bearing: cursor.read_i16()?,
            right_side_bearing: cursor.read_i16()?,
            character_width: cursor.read_i16()?,
            ascent: cursor.read_i16()?,
            descent: cursor.read_i16()?,
            attributes: cursor.read_u16()?,
        })
    }

    pub(crate) fn read_compressed<R: Read + Seek>(
        cursor: &mut Cursor<R>,
    ) -> Result<Self, ReadError> {
        let mut raw = [0u8; 5];
        cursor.read_exact(&mut raw)?;
        Ok(Self::from_compressed(raw))
    }

    /// Decode a compressed record: each byte is stored biased by 0x80.
    pub fn from_compressed(raw: [u8; 5]) -> Self {
        let [lsb, rsb, width, ascent, descent] = raw.map(|byte| byte as i16 - COMPRESSED_BIAS);
        GlyphMetrics {
            left_side_bearing: lsb,
            right_side_bearing: rsb,
            character_width: width,
            ascent,
            descent,
            attributes: 0,
        }
    }
}

/// The header of a metrics table; records are read on demand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MetricsTable {
    entry: TableEntry,
    format: FormatInfo,
    glyph_count: u32,
    records_start: u64,
}

impl MetricsTable {
    /// Read and validate the table header.
    pub fn read<R: Read + Seek>(source: &mut R, entry: &TableEntry) -> Result<Self, ReadError> {
        let (mut cursor, format) = Cursor::for_table(source, entry)?;
        format.expect_variant(&[PCF_DEFAULT_FORMAT, PCF_COMPRESSED_METRICS])?;
        let (glyph_count, record_len) = if format.has_compressed_metrics() {
            (cursor.read_u16()? as u32, COMPRESSED_RECORD_LEN)
        } else {
            (cursor.read_u32()?, RECORD_LEN)
        };
        cursor.ensure(glyph_count as u64 * record_len)?;
        Ok(MetricsTable {
            entry: *entry,
            format,
            glyph_count,
            records_start: cursor.position(),
        })
    }

    pub fn kind(&self) -> TableKind {
        self.entry.kind
    }

    pub fn format(&self) -> FormatInfo {
        self.format
    }

    pub fn is_compressed(&self) -> bool {
        self.format.has_compressed_metrics()
    }

    pub fn glyph_count(&self) -> u32 {
        self.glyph_count
    }

    fn record_len(&self) -> u64 {
        if self.is_compressed() {
            COMPRESSED_RECORD_LEN
        } else {
            RECORD_LEN
        }
    }

    /// Read the metrics for a single glyph.
    pub fn get<R: Read + Seek>(
        &self,
        source: &mut R,
        glyph: GlyphId,
    ) -> Result<GlyphMetrics, ReadError> {
        self.check_range(glyph)?;
        let (mut cursor, _) = Cursor::for_table(source, &self.entry)?;
        cursor.seek_to(self.records_start + glyph.to_u16() as u64 * self.record_len())?;
        self.read_record(&mut cursor)
    }

    /// Read the metrics for several glyphs through a single cursor.
    ///
    /// Pass the glyphs in ascending order to read the table in one forward
    /// pass. A glyph outside the table only fails its own entry; an I/O error
    /// fails the whole call.
    pub fn get_many<R: Read + Seek>(
        &self,
        source: &mut R,
        glyphs: &[GlyphId],
    ) -> Result<Vec<Result<GlyphMetrics, FormatError>>, ReadError> {
        let (mut cursor, _) = Cursor::for_table(source, &self.entry)?;
        glyphs
            .iter()
            .map(|glyph| {
                per_record(self.check_range(*glyph).and_then(|_| {
                    cursor.seek_to(self.records_start + glyph.to_u16() as u64 * self.record_len())?;
                    self.read_record(&mut cursor)
                }))
            })
            .collect()
    }

    /// Read the metrics for every glyph, in glyph order.
    pub fn read_all<R: Read + Seek>(&self, source: &mut R) -> Result<Vec<GlyphMetrics>, ReadError> {
        let all = Vec::with_capacity(self.glyph_count as usize);
        self.fold(source, all, |mut all, metrics| {
            all.push(metrics);
            all
        })
    }

    /// Combine the metrics of every glyph, in glyph order, without holding
    /// more than one record at a time.
    pub fn fold<R, B, F>(&self, source: &mut R, init: B, mut f: F) -> Result<B, ReadError>
    where
        R: Read + Seek,
        F: FnMut(B, GlyphMetrics) -> B,
    {
        let (mut cursor, _) = Cursor::for_table(source, &self.entry)?;
        cursor.seek_to(self.records_start)?;
        let mut acc = init;
        for _ in 0..self.glyph_count {
            acc = f(acc, self.read_record(&mut cursor)?);
        }
        Ok(acc)
    }

    fn check_range(&self, glyph: GlyphId) -> Result<(), ReadError> {
        if glyph.to_u16() as u32 >= self.glyph_count {
            return Err(FormatError::GlyphOutOfRange {
                kind: self.kind(),
                glyph,
                count: self.glyph_count,
            }
            .into());
        }
        Ok(())
    }

    fn read_record<R: Read + Seek>(
        &self,
        cursor: &mut Cursor<R>,
    ) -> Result<GlyphMetrics, ReadError> {
        if self.is_compressed() {
            GlyphMetrics::read_compressed(cursor)
        } else {
            GlyphMetrics::read(cursor)
        }
    }
}
