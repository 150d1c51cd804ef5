//! The ACCELERATORS and BDF_ACCELERATORS tables

use std::io::{Read, Seek};

use crate::directory::TableEntry;
use crate::font_data::Cursor;
use crate::format::{PCF_ACCEL_W_INKBOUNDS, PCF_DEFAULT_FORMAT};
use crate::read::ReadError;
use crate::tables::metrics::GlyphMetrics;

/// A bounding box in pixels, with the offset of its lower left corner from
/// the glyph origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub width: i32,
    pub height: i32,
    pub x_offset: i32,
    pub y_offset: i32,
}

/// Font-wide summary metrics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Accelerators {
    pub no_overlap: bool,
    pub constant_metrics: bool,
    pub terminal_font: bool,
    pub constant_width: bool,
    pub ink_inside: bool,
    pub ink_metrics: bool,
    pub draw_direction_rtl: bool,
    pub font_ascent: i32,
    pub font_descent: i32,
    pub max_overlap: i32,
    pub min_bounds: GlyphMetrics,
    pub max_bounds: GlyphMetrics,
    /// Present only in tables with the ink bounds variant.
    pub ink_min_bounds: Option<GlyphMetrics>,
    pub ink_max_bounds: Option<GlyphMetrics>,
}

impl Accelerators {
    pub fn read<R: Read + Seek>(source: &mut R, entry: &TableEntry) -> Result<Self, ReadError> {
        let (mut cursor, format) = Cursor::for_table(source, entry)?;
        format.expect_variant(&[PCF_DEFAULT_FORMAT, PCF_ACCEL_W_INKBOUNDS])?;
        let mut flags = [0u8; 8];
        cursor.read_exact(&mut flags)?;
        let font_ascent = cursor.read_i32()?;
        let font_descent = cursor.read_i32()?;
        let max_overlap = cursor.read_i32()?;
        let min_bounds = GlyphMetrics::read(&mut cursor)?;
        let max_bounds = GlyphMetrics::read(&mut cursor)?;
        let (ink_min_bounds, ink_max_bounds) = if format.has_ink_bounds() {
            (
                Some(GlyphMetrics::read(&mut cursor)?),
                Some(GlyphMetrics::read(&mut cursor)?),
            )
        } else {
            (None, None)
        };
        Ok(Accelerators {
            no_overlap: flags[0] != 0,
            constant_metrics: flags[1] != 0,
            terminal_font: flags[2] != 0,
            constant_width: flags[3] != 0,
            ink_inside: flags[4] != 0,
            ink_metrics: flags[5] != 0,
            draw_direction_rtl: flags[6] != 0,
            font_ascent,
            font_descent,
            max_overlap,
            min_bounds,
            max_bounds,
            ink_min_bounds,
            ink_max_bounds,
        })
    }

    /// The font bounding box, computed from the ink bounds when present and
    /// from the logical bounds otherwise.
    pub fn bounding_box(&self) -> BoundingBox {
        let (min, max) = match (self.ink_min_bounds, self.ink_max_bounds) {
            (Some(min), Some(max)) => (min, max),
            _ => (self.min_bounds, self.max_bounds),
        };
        BoundingBox {
            width: max.right_side_bearing as i32 - min.left_side_bearing as i32,
            height: max.ascent as i32 + max.descent as i32,
            x_offset: min.left_side_bearing as i32,
            y_offset: -(max.descent as i32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FormatError, TableDirectory, TableKind};
    use pcf_test_data::{Accelerators as TestAccelerators, PcfBuilder, TestGlyph, SINGLE_GLYPH};
    use pretty_assertions::assert_eq;
    use std::io::Cursor as IoCursor;

    fn accelerators(data: &[u8], kind: TableKind) -> Result<Accelerators, ReadError> {
        let mut source = IoCursor::new(data);
        let directory = TableDirectory::read(&mut source)?;
        Accelerators::read(&mut source, directory.require(kind)?)
    }

    #[test]
    fn single_glyph() {
        let accel = accelerators(SINGLE_GLYPH, TableKind::Accelerators).unwrap();
        assert!(!accel.no_overlap);
        assert!(accel.constant_metrics);
        assert!(accel.terminal_font);
        assert!(accel.constant_width);
        assert_eq!((accel.font_ascent, accel.font_descent), (1, 0));
        assert_eq!(accel.ink_min_bounds, None);
        assert_eq!(
            accel.bounding_box(),
            BoundingBox {
                width: 8,
                height: 1,
                x_offset: 0,
                y_offset: 0
            }
        );
    }

    #[test]
    fn logical_bounds() {
        let data = PcfBuilder::new()
            .format(0x00)
            .bdf_accelerators(TestAccelerators {
                font_ascent: 10,
                font_descent: 3,
                ..Default::default()
            })
            .glyph(TestGlyph::new(0x41, -1, 6, 7, 9, 2))
            .glyph(TestGlyph::new(0x42, 1, 8, 8, 10, 3))
            .build();
        let accel = accelerators(&data, TableKind::BdfAccelerators).unwrap();
        assert_eq!(accel.min_bounds.left_side_bearing, -1);
        assert_eq!(accel.max_bounds.right_side_bearing, 8);
        assert_eq!(
            accel.bounding_box(),
            BoundingBox {
                width: 9,
                height: 13,
                x_offset: -1,
                y_offset: -3
            }
        );
    }

    #[test]
    fn ink_bounds_take_precedence() {
        let data = PcfBuilder::new()
            .accelerators(TestAccelerators {
                font_ascent: 12,
                font_descent: 4,
                ink_bounds: Some([[1, 0, 0, 0, 0], [0, 5, 0, 7, 2]]),
                ..Default::default()
            })
            .glyph(TestGlyph::new(0x41, 0, 8, 8, 12, 4))
            .build();
        let accel = accelerators(&data, TableKind::Accelerators).unwrap();
        assert!(accel.ink_max_bounds.is_some());
        assert_eq!(
            accel.bounding_box(),
            BoundingBox {
                width: 4,
                height: 9,
                x_offset: 1,
                y_offset: -2
            }
        );
    }

    #[test]
    fn truncated() {
        let mut data = SINGLE_GLYPH.to_vec();
        // shrink the ACCELERATORS table by one byte
        data[pcf_test_data::toc_entry_offset(0) + 8] = 47;
        assert_eq!(
            accelerators(&data, TableKind::Accelerators)
                .unwrap_err()
                .format_error(),
            Some(FormatError::TruncatedTable(TableKind::Accelerators))
        );
    }
}
