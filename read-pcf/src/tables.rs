//! The PCF tables
//!
//! Each submodule reads one kind of table. Tables whose contents are small
//! are loaded eagerly; the per-glyph tables only parse their headers and
//! read individual records on demand.

pub mod accelerators;
pub mod bitmaps;
pub mod encodings;
pub mod metrics;
pub mod properties;
