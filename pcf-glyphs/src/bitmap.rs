//! Canonical glyph bitmaps.
//!
//! PCF stores each bitmap row padded to the font's glyph pad, in one of
//! several byte and bit orders. [`GlyphBitmap::unpack`] normalizes those
//! rows so consumers only ever see one layout: most significant bit is the
//! leftmost pixel, and each row holds just enough bytes to cover the glyph
//! width.

use raw::{tables::bitmaps::bytes_per_row, BitOrder, ByteOrder, FormatError, FormatInfo, TableKind};

/// A 1-bit glyph image in canonical layout.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GlyphBitmap {
    width: u16,
    height: u16,
    stride: usize,
    data: Vec<u8>,
}

impl GlyphBitmap {
    /// Normalize packed bitmap bytes as stored in a table with `format`.
    ///
    /// `packed` must hold `height` rows padded to the format's glyph pad.
    /// Bits past `width` in the last byte of each row are cleared.
    pub fn unpack(
        packed: &[u8],
        format: &FormatInfo,
        width: u16,
        height: u16,
    ) -> Result<Self, FormatError> {
        let stride = (width as usize).div_ceil(8);
        if width == 0 || height == 0 {
            return Ok(Self {
                width,
                height,
                stride,
                data: Vec::new(),
            });
        }
        let packed_stride = bytes_per_row(width, format.glyph_pad_bytes());
        let packed = packed
            .get(..packed_stride * height as usize)
            .ok_or(FormatError::TruncatedTable(TableKind::Bitmaps))?;

        let swap_unit = format.scan_unit_bytes().min(format.glyph_pad_bytes());
        let msb_bytes = format.byte_order() == ByteOrder::MsbFirst;
        let msb_bits = format.bit_order() == BitOrder::MsbFirst;
        let swap = swap_unit > 1 && msb_bytes != msb_bits;
        let tail_mask = match width % 8 {
            0 => 0xFF,
            bits => 0xFFu8 << (8 - bits),
        };

        let mut data = Vec::with_capacity(stride * height as usize);
        let mut row = vec![0u8; packed_stride];
        for packed_row in packed.chunks_exact(packed_stride) {
            row.copy_from_slice(packed_row);
            if swap {
                row.chunks_exact_mut(swap_unit)
                    .for_each(|unit| unit.reverse());
            }
            if !msb_bits {
                row.iter_mut().for_each(|byte| *byte = byte.reverse_bits());
            }
            data.extend_from_slice(&row[..stride]);
            if let Some(last) = data.last_mut() {
                *last &= tail_mask;
            }
        }
        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    /// Create a bitmap from rows that are already canonical.
    pub fn from_rows<R: AsRef<[u8]>>(width: u16, rows: &[R]) -> Self {
        let stride = (width as usize).div_ceil(8);
        let mut data = Vec::with_capacity(stride * rows.len());
        for row in rows {
            let row = row.as_ref();
            let len = row.len().min(stride);
            data.extend_from_slice(&row[..len]);
            data.resize(data.len() + stride - len, 0);
        }
        Self {
            width,
            height: rows.len() as u16,
            stride,
            data,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Number of bytes in each row.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// All rows, back to back.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns true if the bitmap has no pixels.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over the rows from top to bottom.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[u8]> + '_ {
        self.data.chunks_exact(self.stride.max(1))
    }

    pub fn row(&self, y: u16) -> Option<&[u8]> {
        let start = y as usize * self.stride;
        self.data.get(start..start + self.stride)
    }

    /// Returns true if the pixel at (`x`, `y`) is set. Pixels outside the
    /// bitmap are unset.
    pub fn pixel(&self, x: u16, y: u16) -> bool {
        if x >= self.width {
            return false;
        }
        self.row(y)
            .map(|row| row[x as usize / 8] & (0x80 >> (x % 8)) != 0)
            .unwrap_or(false)
    }
}
