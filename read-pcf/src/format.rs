//! Decoding of the per-table format word.
//!
//! Every PCF table starts with a little-endian 32-bit format word that
//! describes how the rest of the table is laid out. The low byte is shared by
//! all tables:
//!
//! | bits | meaning                                           |
//! |------|---------------------------------------------------|
//! | 0-1  | glyph row padding, as a power of two (1..8 bytes) |
//! | 2    | byte order, set for most significant byte first   |
//! | 3    | bit order, set for most significant bit first     |
//! | 4-5  | scan unit, as a power of two (1..4 bytes)         |
//!
//! The remaining bits select a table-specific variant, such as compressed
//! metrics.

use crate::read::FormatError;

/// The default variant of a table.
pub const PCF_DEFAULT_FORMAT: u32 = 0x0000_0000;
/// Metrics tables stored as biased bytes.
pub const PCF_COMPRESSED_METRICS: u32 = 0x0000_0100;
/// Accelerator tables that also carry ink bounds.
pub const PCF_ACCEL_W_INKBOUNDS: u32 = 0x0000_0100;
/// Ink bounds variant.
pub const PCF_INKBOUNDS: u32 = 0x0000_0200;

const GLYPH_PAD_MASK: u32 = 3;
const BYTE_MASK: u32 = 1 << 2;
const BIT_MASK: u32 = 1 << 3;
const SCAN_UNIT_MASK: u32 = 3 << 4;
const RESERVED_MASK: u32 = 3 << 6;
const VARIANT_MASK: u32 = 0xFFFF_FF00;

/// Order of the bytes in multi-byte values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    LsbFirst,
    MsbFirst,
}

impl ByteOrder {
    pub(crate) fn u16_from(self, bytes: [u8; 2]) -> u16 {
        match self {
            ByteOrder::LsbFirst => u16::from_le_bytes(bytes),
            ByteOrder::MsbFirst => u16::from_be_bytes(bytes),
        }
    }

    pub(crate) fn u32_from(self, bytes: [u8; 4]) -> u32 {
        match self {
            ByteOrder::LsbFirst => u32::from_le_bytes(bytes),
            ByteOrder::MsbFirst => u32::from_be_bytes(bytes),
        }
    }
}

/// Order of the pixels within each byte of bitmap data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BitOrder {
    LsbFirst,
    MsbFirst,
}

/// The decoded contents of a format word.
///
/// Each table chooses its own format, so this is derived per table and never
/// shared between them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FormatInfo {
    raw: u32,
    byte_order: ByteOrder,
    bit_order: BitOrder,
    glyph_pad: u8,
    scan_unit: u8,
}

impl FormatInfo {
    /// Decode a raw format word.
    pub fn new(raw: u32) -> Result<Self, FormatError> {
        let scan_exponent = (raw & SCAN_UNIT_MASK) >> 4;
        if scan_exponent > 2 || raw & RESERVED_MASK != 0 {
            return Err(FormatError::UnsupportedEncoding(raw));
        }
        let byte_order = if raw & BYTE_MASK != 0 {
            ByteOrder::MsbFirst
        } else {
            ByteOrder::LsbFirst
        };
        let bit_order = if raw & BIT_MASK != 0 {
            BitOrder::MsbFirst
        } else {
            BitOrder::LsbFirst
        };
        Ok(FormatInfo {
            raw,
            byte_order,
            bit_order,
            glyph_pad: 1 << (raw & GLYPH_PAD_MASK),
            scan_unit: 1 << scan_exponent,
        })
    }

    /// The raw format word.
    pub fn raw(&self) -> u32 {
        self.raw
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn bit_order(&self) -> BitOrder {
        self.bit_order
    }

    /// Bitmap rows are padded to a multiple of this many bytes.
    pub fn glyph_pad_bytes(&self) -> usize {
        self.glyph_pad as usize
    }

    /// Index of the glyph padding into the four bitmap size slots.
    pub fn glyph_pad_index(&self) -> usize {
        (self.raw & GLYPH_PAD_MASK) as usize
    }

    /// Byte order swaps in bitmap data operate on units of this size.
    pub fn scan_unit_bytes(&self) -> usize {
        self.scan_unit as usize
    }

    /// The table-specific variant bits.
    pub fn variant(&self) -> u32 {
        self.raw & VARIANT_MASK
    }

    /// `true` for metrics tables using the compact byte encoding.
    pub fn has_compressed_metrics(&self) -> bool {
        self.variant() == PCF_COMPRESSED_METRICS
    }

    /// `true` for accelerator tables that carry ink bounds.
    pub fn has_ink_bounds(&self) -> bool {
        self.variant() == PCF_ACCEL_W_INKBOUNDS
    }

    pub(crate) fn expect_variant(&self, allowed: &[u32]) -> Result<(), FormatError> {
        if allowed.contains(&self.variant()) {
            Ok(())
        } else {
            Err(FormatError::UnsupportedEncoding(self.raw))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_common_format() {
        // the format written by bdftopcf by default
        let format = FormatInfo::new(0x0E).unwrap();
        assert_eq!(format.byte_order(), ByteOrder::MsbFirst);
        assert_eq!(format.bit_order(), BitOrder::MsbFirst);
        assert_eq!(format.glyph_pad_bytes(), 4);
        assert_eq!(format.glyph_pad_index(), 2);
        assert_eq!(format.scan_unit_bytes(), 1);
        assert!(!format.has_compressed_metrics());
    }

    #[test]
    fn decode_all_layouts() {
        for pad in 0..4u32 {
            for scan in 0..3u32 {
                for byte in [0, BYTE_MASK] {
                    for bit in [0, BIT_MASK] {
                        let raw = pad | byte | bit | (scan << 4);
                        let format = FormatInfo::new(raw).unwrap();
                        assert_eq!(format.glyph_pad_bytes(), 1 << pad);
                        assert_eq!(format.scan_unit_bytes(), 1 << scan);
                        assert_eq!(format.byte_order() == ByteOrder::MsbFirst, byte != 0);
                        assert_eq!(format.bit_order() == BitOrder::MsbFirst, bit != 0);
                    }
                }
            }
        }
    }

    #[test]
    fn compressed_variant() {
        let format = FormatInfo::new(PCF_COMPRESSED_METRICS | 0x0E).unwrap();
        assert!(format.has_compressed_metrics());
        assert_eq!(format.variant(), PCF_COMPRESSED_METRICS);
        assert!(format
            .expect_variant(&[PCF_DEFAULT_FORMAT, PCF_COMPRESSED_METRICS])
            .is_ok());
        assert_eq!(
            format.expect_variant(&[PCF_DEFAULT_FORMAT]),
            Err(FormatError::UnsupportedEncoding(0x10E))
        );
    }

    #[test]
    fn reject_unknown_layouts() {
        assert_eq!(
            FormatInfo::new(0x30),
            Err(FormatError::UnsupportedEncoding(0x30))
        );
        assert_eq!(
            FormatInfo::new(0x4E),
            Err(FormatError::UnsupportedEncoding(0x4E))
        );
    }
}
