//! Glyph access for PCF bitmap fonts.
//!
//! This crate sits on top of [`read-pcf`](raw) and turns raw table records
//! into ready to draw glyphs: bitmaps are normalized to a single canonical
//! layout and decoded glyphs are kept in a bounded, least recently used
//! cache.
//!
//! # Example
//!
//! ```no_run
//! use pcf_glyphs::{Font, FontSettings};
//!
//! let file = std::fs::File::open("font.pcf").unwrap();
//! let mut font = Font::with_settings(
//!     std::io::BufReader::new(file),
//!     FontSettings::default().cache_capacity(64),
//! )
//! .unwrap();
//! // prefetch in one pass, then draw
//! font.load_glyphs("Hello".chars());
//! for ch in "Hello".chars() {
//!     if let Some(glyph) = font.glyph(ch).unwrap() {
//!         println!("{ch}: {}x{} advance {}", glyph.width(), glyph.height(), glyph.advance());
//!     }
//! }
//! ```

#![forbid(unsafe_code)]

/// Expose our "raw" underlying parser crate.
pub extern crate read_pcf as raw;

pub mod bitmap;
pub mod cache;
mod font;
mod glyph;

pub use bitmap::GlyphBitmap;
pub use cache::{BatchSummary, GlyphCache, GlyphSource, LruCache};
pub use font::{Font, FontSettings, DEFAULT_CACHE_CAPACITY};
pub use glyph::Glyph;

/// Type for a glyph identifier.
pub type GlyphId = raw::GlyphId;

/// Type for per-glyph metrics.
pub type GlyphMetrics = raw::GlyphMetrics;

/// Type for the font bounding box.
pub type BoundingBox = raw::BoundingBox;
