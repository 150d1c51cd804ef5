//! Reading PCF fonts
//!
//! This crate provides bounds-checked access to the tables of a font in the
//! X11 [Portable Compiled Format][pcf]. It reads from any seekable byte
//! source and never loads more of the file than a request needs.
//!
//! The crate is intentionally low level: glyphs are addressed by
//! [`GlyphId`], bitmaps are returned exactly as stored, and nothing is
//! cached. For decoded glyph images and a glyph cache, see `pcf-glyphs`.
//!
//! # Example
//!
//! ```no_run
//! use read_pcf::{tables::encodings::EncodingTable, TableDirectory, TableKind};
//! let mut file = std::fs::File::open("font.pcf").unwrap();
//! let directory = TableDirectory::read(&mut file).unwrap();
//! let entry = directory.require(TableKind::BdfEncodings).unwrap();
//! let encodings = EncodingTable::read(&mut file, entry).unwrap();
//! println!("'A' maps to {:?}", encodings.resolve('A' as u32));
//! ```
//!
//! [pcf]: https://fontforge.org/docs/techref/pcf-format.html

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

mod directory;
mod font_data;
mod format;
mod glyph_id;
mod read;
pub mod tables;

pub use directory::{TableDirectory, TableEntry, TableKind, MAGIC};
pub use font_data::{source_len, Cursor};
pub use format::{
    BitOrder, ByteOrder, FormatInfo, PCF_ACCEL_W_INKBOUNDS, PCF_COMPRESSED_METRICS,
    PCF_DEFAULT_FORMAT, PCF_INKBOUNDS,
};
pub use glyph_id::GlyphId;
pub use read::{FormatError, ReadError};
pub use tables::{
    accelerators::{Accelerators, BoundingBox},
    bitmaps::BitmapTable,
    encodings::{EncodingTable, NO_GLYPH},
    metrics::{GlyphMetrics, MetricsTable},
    properties::{Properties, PropertyValue},
};
