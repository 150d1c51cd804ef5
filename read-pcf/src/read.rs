//! Errors that occur while reading PCF data

use crate::{GlyphId, TableKind};

/// An error that occurs when reading font data.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReadError {
    /// Returns the format error, if this is one.
    pub fn format_error(&self) -> Option<FormatError> {
        match self {
            ReadError::Format(err) => Some(*err),
            ReadError::Io(_) => None,
        }
    }
}

/// Split a record read into a per-record result and an error that ends the
/// whole operation.
///
/// Format errors concern a single record; I/O errors leave the source in an
/// unknown state and are passed up.
pub(crate) fn per_record<T>(
    result: Result<T, ReadError>,
) -> Result<Result<T, FormatError>, ReadError> {
    match result {
        Ok(value) => Ok(Ok(value)),
        Err(ReadError::Format(err)) => Ok(Err(err)),
        Err(err) => Err(err),
    }
}

/// The font data does not describe a valid PCF file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("missing PCF magic bytes")]
    BadMagic,
    #[error("table directory extends past the end of the file")]
    TruncatedDirectory,
    #[error("the {0} table appears more than once")]
    DuplicateTable(TableKind),
    #[error("unsupported table format 0x{0:08X}")]
    UnsupportedEncoding(u32),
    #[error("the {0} table is truncated")]
    TruncatedTable(TableKind),
    #[error("the {0} table is missing")]
    MissingTable(TableKind),
    #[error("{glyph} is out of range for the {kind} table ({count} glyphs)")]
    GlyphOutOfRange {
        kind: TableKind,
        glyph: GlyphId,
        count: u32,
    },
    #[error("malformed {kind} table: {reason}")]
    Malformed {
        kind: TableKind,
        reason: &'static str,
    },
}
