//! Positioned reads over a seekable byte source.

use std::io::{ErrorKind, Read, Seek, SeekFrom};

use crate::directory::{TableEntry, TableKind};
use crate::format::{ByteOrder, FormatInfo};
use crate::read::{FormatError, ReadError};

/// A cursor for reading fixed-width values from a region of a byte source.
///
/// The cursor is bounded: reads that would run past the end of the region
/// fail with [`FormatError::TruncatedTable`] (or
/// [`FormatError::TruncatedDirectory`] for the file header) rather than
/// touching bytes that belong to something else.
pub struct Cursor<'a, R> {
    source: &'a mut R,
    kind: Option<TableKind>,
    start: u64,
    end: u64,
    pos: u64,
    order: ByteOrder,
    // false after a failed read, when the source position is unknown
    synced: bool,
}

impl<'a, R: Read + Seek> Cursor<'a, R> {
    /// Create a cursor over the first `len` bytes of the source.
    ///
    /// Multi-byte values are read least significant byte first, as used by
    /// the file header.
    pub fn new(source: &'a mut R, len: u64) -> Result<Self, ReadError> {
        source.seek(SeekFrom::Start(0))?;
        Ok(Self {
            source,
            kind: None,
            start: 0,
            end: len,
            pos: 0,
            order: ByteOrder::LsbFirst,
            synced: true,
        })
    }

    /// Create a cursor over a single table, positioned after its format word.
    ///
    /// The format word stored in the table must match the one recorded in the
    /// directory; the returned cursor reads values in the byte order it
    /// declares.
    pub fn for_table(
        source: &'a mut R,
        entry: &TableEntry,
    ) -> Result<(Self, FormatInfo), ReadError> {
        let start = entry.offset as u64;
        source.seek(SeekFrom::Start(start))?;
        let mut cursor = Self {
            source,
            kind: Some(entry.kind),
            start,
            end: start + entry.size as u64,
            pos: 0,
            order: ByteOrder::LsbFirst,
            synced: true,
        };
        let raw = cursor.read_u32()?;
        if raw != entry.format {
            return Err(FormatError::Malformed {
                kind: entry.kind,
                reason: "format word differs from the table directory",
            }
            .into());
        }
        let format = FormatInfo::new(raw)?;
        cursor.order = format.byte_order();
        Ok((cursor, format))
    }

    /// The current position, relative to the start of the region.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// The number of bytes left in the region.
    pub fn remaining(&self) -> u64 {
        (self.end - self.start).saturating_sub(self.pos)
    }

    /// Move to `pos`, relative to the start of the region.
    ///
    /// Short moves are relative seeks, so a buffered source keeps its buffer
    /// while a caller sweeps forward through a table.
    pub fn seek_to(&mut self, pos: u64) -> Result<(), ReadError> {
        if self.start + pos > self.end {
            return Err(self.truncated().into());
        }
        if self.synced {
            self.source.seek_relative(pos as i64 - self.pos as i64)?;
        } else {
            self.source.seek(SeekFrom::Start(self.start + pos))?;
            self.synced = true;
        }
        self.pos = pos;
        Ok(())
    }

    /// Fail unless at least `len` bytes remain.
    pub fn ensure(&self, len: u64) -> Result<(), FormatError> {
        if len > self.remaining() {
            Err(self.truncated())
        } else {
            Ok(())
        }
    }

    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), ReadError> {
        self.ensure(buf.len() as u64)?;
        match self.source.read_exact(buf) {
            Ok(()) => {
                self.pos += buf.len() as u64;
                Ok(())
            }
            Err(err) => {
                self.synced = false;
                if err.kind() == ErrorKind::UnexpectedEof {
                    Err(self.truncated().into())
                } else {
                    Err(err.into())
                }
            }
        }
    }

    pub fn read_vec(&mut self, len: usize) -> Result<Vec<u8>, ReadError> {
        self.ensure(len as u64)?;
        let mut buf = vec![0; len];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ReadError> {
        let mut buf = [0; N];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8, ReadError> {
        self.read_array::<1>().map(|[byte]| byte)
    }

    pub fn read_u16(&mut self) -> Result<u16, ReadError> {
        let bytes = self.read_array()?;
        Ok(self.order.u16_from(bytes))
    }

    pub fn read_i16(&mut self) -> Result<i16, ReadError> {
        self.read_u16().map(|v| v as i16)
    }

    pub fn read_u32(&mut self) -> Result<u32, ReadError> {
        let bytes = self.read_array()?;
        Ok(self.order.u32_from(bytes))
    }

    pub fn read_i32(&mut self) -> Result<i32, ReadError> {
        self.read_u32().map(|v| v as i32)
    }

    fn truncated(&self) -> FormatError {
        match self.kind {
            Some(kind) => FormatError::TruncatedTable(kind),
            None => FormatError::TruncatedDirectory,
        }
    }
}

/// The total length of a byte source, leaving it positioned at the start.
pub fn source_len<R: Seek>(source: &mut R) -> Result<u64, ReadError> {
    let len = source.seek(SeekFrom::End(0))?;
    source.seek(SeekFrom::Start(0))?;
    Ok(len)
}
