//! Decoded glyphs.

use raw::{GlyphId, GlyphMetrics};

use crate::bitmap::GlyphBitmap;

/// A decoded glyph: its metrics and canonical bitmap.
///
/// The bitmap is `metrics.width()` by `metrics.height()` pixels. Its lower
/// left corner sits at ([`x_offset`](Self::x_offset),
/// [`y_offset`](Self::y_offset)) relative to the glyph origin on the
/// baseline.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Glyph {
    pub glyph_id: GlyphId,
    pub metrics: GlyphMetrics,
    pub bitmap: GlyphBitmap,
}

impl Glyph {
    /// Horizontal distance to the origin of the next glyph.
    pub fn advance(&self) -> i16 {
        self.metrics.character_width
    }

    pub fn x_offset(&self) -> i16 {
        self.metrics.left_side_bearing
    }

    pub fn y_offset(&self) -> i16 {
        self.metrics.descent.saturating_neg()
    }

    pub fn width(&self) -> u16 {
        self.bitmap.width()
    }

    pub fn height(&self) -> u16 {
        self.bitmap.height()
    }
}
