//! The BITMAPS table

use std::io::{Read, Seek};

use crate::directory::{TableEntry, TableKind};
use crate::font_data::Cursor;
use crate::format::{FormatInfo, PCF_DEFAULT_FORMAT};
use crate::read::{per_record, FormatError, ReadError};
use crate::GlyphId;

/// Number of stored bytes per row for a glyph `width` pixels wide, when
/// rows are padded to a multiple of `pad` bytes.
pub fn bytes_per_row(width: u16, pad: usize) -> usize {
    (width as usize).div_ceil(8 * pad) * pad
}

/// The header of a bitmap table.
///
/// Holds the location of the offset array and the glyph data blob; the
/// packed bitmaps themselves are read on demand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitmapTable {
    entry: TableEntry,
    format: FormatInfo,
    glyph_count: u32,
    offsets_start: u64,
    data_start: u64,
    sizes: [u32; 4],
}

impl BitmapTable {
    pub fn read<R: Read + Seek>(source: &mut R, entry: &TableEntry) -> Result<Self, ReadError> {
        let (mut cursor, format) = Cursor::for_table(source, entry)?;
        format.expect_variant(&[PCF_DEFAULT_FORMAT])?;
        let glyph_count = cursor.read_u32()?;
        let offsets_start = cursor.position();
        cursor.ensure(glyph_count as u64 * 4)?;
        cursor.seek_to(offsets_start + glyph_count as u64 * 4)?;
        let mut sizes = [0u32; 4];
        for size in sizes.iter_mut() {
            *size = cursor.read_u32()?;
        }
        let table = BitmapTable {
            entry: *entry,
            format,
            glyph_count,
            offsets_start,
            data_start: cursor.position(),
            sizes,
        };
        cursor.ensure(table.data_size() as u64)?;
        Ok(table)
    }

    pub fn format(&self) -> FormatInfo {
        self.format
    }

    pub fn glyph_count(&self) -> u32 {
        self.glyph_count
    }

    /// Total size of the glyph data for each of the four paddings.
    pub fn sizes(&self) -> [u32; 4] {
        self.sizes
    }

    /// Size of the glyph data blob for the padding this table uses.
    pub fn data_size(&self) -> u32 {
        self.sizes[self.format.glyph_pad_index()]
    }

    /// Bytes per stored row for a glyph `width` pixels wide.
    pub fn row_stride(&self, width: u16) -> usize {
        bytes_per_row(width, self.format.glyph_pad_bytes())
    }

    /// The offset of a glyph's bitmap within the data blob.
    pub fn offset<R: Read + Seek>(&self, source: &mut R, glyph: GlyphId) -> Result<u32, ReadError> {
        self.check_range(glyph)?;
        let (mut cursor, _) = Cursor::for_table(source, &self.entry)?;
        self.read_offset(&mut cursor, glyph)
    }

    /// The bitmap offsets of several glyphs, read through a single cursor.
    ///
    /// Glyphs in ascending order are read in one forward pass.
    pub fn offsets<R: Read + Seek>(
        &self,
        source: &mut R,
        glyphs: &[GlyphId],
    ) -> Result<Vec<Result<u32, FormatError>>, ReadError> {
        let (mut cursor, _) = Cursor::for_table(source, &self.entry)?;
        glyphs
            .iter()
            .map(|glyph| {
                per_record(
                    self.check_range(*glyph)
                        .and_then(|_| self.read_offset(&mut cursor, *glyph)),
                )
            })
            .collect()
    }

    fn check_range(&self, glyph: GlyphId) -> Result<(), ReadError> {
        if glyph.to_u16() as u32 >= self.glyph_count {
            return Err(FormatError::GlyphOutOfRange {
                kind: TableKind::Bitmaps,
                glyph,
                count: self.glyph_count,
            }
            .into());
        }
        Ok(())
    }

    fn read_offset<R: Read + Seek>(
        &self,
        cursor: &mut Cursor<R>,
        glyph: GlyphId,
    ) -> Result<u32, ReadError> {
        cursor.seek_to(self.offsets_start + glyph.to_u16() as u64 * 4)?;
        cursor.read_u32()
    }

    /// Read the packed bitmap at `offset` for a glyph of the given size.
    ///
    /// The bytes are returned exactly as stored, padding and byte order
    /// included.
    pub fn read_at<R: Read + Seek>(
        &self,
        source: &mut R,
        offset: u32,
        width: u16,
        height: u16,
    ) -> Result<Vec<u8>, ReadError> {
        let (mut cursor, _) = Cursor::for_table(source, &self.entry)?;
        self.read_data(&mut cursor, offset, width, height)
    }

    /// Read several packed bitmaps through a single cursor.
    ///
    /// Each request is `(offset, width, height)`; requests sorted by offset
    /// are read in one forward pass over the glyph data.
    pub fn read_many<R: Read + Seek>(
        &self,
        source: &mut R,
        requests: &[(u32, u16, u16)],
    ) -> Result<Vec<Result<Vec<u8>, FormatError>>, ReadError> {
        let (mut cursor, _) = Cursor::for_table(source, &self.entry)?;
        requests
            .iter()
            .map(|(offset, width, height)| {
                per_record(self.read_data(&mut cursor, *offset, *width, *height))
            })
            .collect()
    }

    fn read_data<R: Read + Seek>(
        &self,
        cursor: &mut Cursor<R>,
        offset: u32,
        width: u16,
        height: u16,
    ) -> Result<Vec<u8>, ReadError> {
        let len = self.row_stride(width) as u64 * height as u64;
        if offset as u64 + len > self.data_size() as u64 {
            return Err(FormatError::TruncatedTable(TableKind::Bitmaps).into());
        }
        cursor.seek_to(self.data_start + offset as u64)?;
        cursor.read_vec(len as usize)
    }

    /// Read the packed bitmap for a glyph.
    pub fn read_glyph<R: Read + Seek>(
        &self,
        source: &mut R,
        glyph: GlyphId,
        width: u16,
        height: u16,
    ) -> Result<Vec<u8>, ReadError> {
        let offset = self.offset(source, glyph)?;
        self.read_at(source, offset, width, height)
    }
}
