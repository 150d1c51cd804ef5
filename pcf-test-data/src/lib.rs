//! test data shared between the pcf crates.
//!
//! Static fixtures are annotated byte-for-byte; anything more elaborate is
//! synthesized with [`PcfBuilder`].

pub mod builder;

pub use builder::{
    bytes_per_row, encode_rows, Accelerators, PcfBuilder, TestGlyph, ACCELERATORS,
    BDF_ACCELERATORS, BDF_ENCODINGS, BITMAPS, INK_METRICS, METRICS, PROPERTIES,
};

/// Format word used by [`SINGLE_GLYPH`]: glyph pad 1, MSByte first,
/// MSBit first, scan unit 1.
pub const MSB_PAD1: u32 = 0x0C;

/// Offset of the first table directory entry.
pub const TOC_START: usize = 8;

/// Size of a single table directory entry.
pub const TOC_ENTRY_LEN: usize = 16;

/// Byte offset of the directory entry at `index`.
pub const fn toc_entry_offset(index: usize) -> usize {
    TOC_START + index * TOC_ENTRY_LEN
}

/// A single 8x1 glyph for 'A' whose only row is `0b1011_0000`.
#[rustfmt::skip]
pub static SINGLE_GLYPH: &[u8] = &[
    0x01, 0x66, 0x63, 0x70,                         // magic "\x01fcp"
    0x04, 0x00, 0x00, 0x00,                         // table count 4 (LE)
    // table directory, all little-endian: type, format, size, offset
    0x02, 0x00, 0x00, 0x00, 0x0C, 0x00, 0x00, 0x00, // ACCELERATORS, fmt 0x0C
    0x30, 0x00, 0x00, 0x00, 0x48, 0x00, 0x00, 0x00, //   size 48, offset 72
    0x04, 0x00, 0x00, 0x00, 0x0C, 0x00, 0x00, 0x00, // METRICS, fmt 0x0C
    0x14, 0x00, 0x00, 0x00, 0x78, 0x00, 0x00, 0x00, //   size 20, offset 120
    0x08, 0x00, 0x00, 0x00, 0x0C, 0x00, 0x00, 0x00, // BITMAPS, fmt 0x0C
    0x1D, 0x00, 0x00, 0x00, 0x8C, 0x00, 0x00, 0x00, //   size 29, offset 140
    0x20, 0x00, 0x00, 0x00, 0x0C, 0x00, 0x00, 0x00, // BDF_ENCODINGS, fmt 0x0C
    0x10, 0x00, 0x00, 0x00, 0xA9, 0x00, 0x00, 0x00, //   size 16, offset 169
    // accelerators @72
    0x0C, 0x00, 0x00, 0x00,                         // format (LE)
    0x00, 0x01, 0x01, 0x01,                         // noOverlap, constMetrics, terminal, constWidth
    0x00, 0x00, 0x00, 0x00,                         // inkInside, inkMetrics, drawDirection, padding
    0x00, 0x00, 0x00, 0x01,                         // fontAscent 1
    0x00, 0x00, 0x00, 0x00,                         // fontDescent 0
    0x00, 0x00, 0x00, 0x00,                         // maxOverlap 0
    0x00, 0x00, 0x00, 0x08, 0x00, 0x08,             // minbounds: lsb 0, rsb 8, width 8
    0x00, 0x01, 0x00, 0x00, 0x00, 0x00,             //   ascent 1, descent 0, attributes 0
    0x00, 0x00, 0x00, 0x08, 0x00, 0x08,             // maxbounds: lsb 0, rsb 8, width 8
    0x00, 0x01, 0x00, 0x00, 0x00, 0x00,             //   ascent 1, descent 0, attributes 0
    // metrics @120
    0x0C, 0x00, 0x00, 0x00,                         // format (LE)
    0x00, 0x00, 0x00, 0x01,                         // glyph count 1
    0x00, 0x00, 0x00, 0x08, 0x00, 0x08,             // lsb 0, rsb 8, width 8
    0x00, 0x01, 0x00, 0x00, 0x00, 0x00,             // ascent 1, descent 0, attributes 0
    // bitmaps @140
    0x0C, 0x00, 0x00, 0x00,                         // format (LE)
    0x00, 0x00, 0x00, 0x01,                         // glyph count 1
    0x00, 0x00, 0x00, 0x00,                         // offsets[0] = 0
    0x00, 0x00, 0x00, 0x01,                         // bitmap size for pad 1
    0x00, 0x00, 0x00, 0x02,                         // pad 2
    0x00, 0x00, 0x00, 0x04,                         // pad 4
    0x00, 0x00, 0x00, 0x08,                         // pad 8
    0b1011_0000,                                    // glyph 0, row 0
    // encodings @169
    0x0C, 0x00, 0x00, 0x00,                         // format (LE)
    0x00, 0x41, 0x00, 0x41,                         // min/max byte2 'A'
    0x00, 0x00, 0x00, 0x00,                         // min/max byte1 0 (single byte)
    0x00, 0x41,                                     // default char 'A'
    0x00, 0x00,                                     // 'A' -> glyph 0
];

/// [`SINGLE_GLYPH`] with the first magic byte zeroed.
pub fn bad_magic() -> Vec<u8> {
    let mut data = SINGLE_GLYPH.to_vec();
    data[0] = 0x00;
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_glyph_tables_are_in_bounds() {
        for i in 0..4 {
            let entry = &SINGLE_GLYPH[toc_entry_offset(i)..toc_entry_offset(i + 1)];
            let size = u32::from_le_bytes(entry[8..12].try_into().unwrap()) as usize;
            let offset = u32::from_le_bytes(entry[12..16].try_into().unwrap()) as usize;
            assert!(offset + size <= SINGLE_GLYPH.len());
        }
        assert_eq!(SINGLE_GLYPH.len(), 185);
    }

    #[test]
    fn builder_matches_hand_written_fixture() {
        let built = PcfBuilder::new()
            .format(MSB_PAD1)
            .accelerators(Accelerators {
                flags: [0, 1, 1, 1, 0, 0, 0, 0],
                font_ascent: 1,
                ..Default::default()
            })
            .glyph(TestGlyph::new('A' as u32, 0, 8, 8, 1, 0).rows([[0b1011_0000]]))
            .default_char('A' as u32)
            .build();
        assert_eq!(built, SINGLE_GLYPH);
    }
}
