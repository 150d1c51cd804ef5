//! The file header and table of contents.

use std::io::{Read, Seek};
use std::ops::Range;

use crate::font_data::{source_len, Cursor};
use crate::read::{FormatError, ReadError};

/// The four bytes every PCF file starts with.
pub const MAGIC: [u8; 4] = *b"\x01fcp";

const HEADER_LEN: u64 = 8;
const ENTRY_LEN: u64 = 16;

/// The kinds of table a PCF file may contain.
///
/// In the directory each kind is identified by a single bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TableKind {
    Properties,
    Accelerators,
    Metrics,
    Bitmaps,
    InkMetrics,
    BdfEncodings,
    Swidths,
    GlyphNames,
    BdfAccelerators,
}

impl TableKind {
    pub const ALL: [TableKind; 9] = [
        TableKind::Properties,
        TableKind::Accelerators,
        TableKind::Metrics,
        TableKind::Bitmaps,
        TableKind::InkMetrics,
        TableKind::BdfEncodings,
        TableKind::Swidths,
        TableKind::GlyphNames,
        TableKind::BdfAccelerators,
    ];

    /// The type bit used for this kind in the table directory.
    pub const fn type_bit(self) -> u32 {
        1 << self as u32
    }

    /// Look up the kind for a directory type field.
    pub fn from_type_bit(bits: u32) -> Option<Self> {
        if bits.count_ones() != 1 {
            return None;
        }
        Self::ALL.get(bits.trailing_zeros() as usize).copied()
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TableKind::Properties => "PROPERTIES",
            TableKind::Accelerators => "ACCELERATORS",
            TableKind::Metrics => "METRICS",
            TableKind::Bitmaps => "BITMAPS",
            TableKind::InkMetrics => "INK_METRICS",
            TableKind::BdfEncodings => "BDF_ENCODINGS",
            TableKind::Swidths => "SWIDTHS",
            TableKind::GlyphNames => "GLYPH_NAMES",
            TableKind::BdfAccelerators => "BDF_ACCELERATORS",
        };
        f.write_str(name)
    }
}

/// A single entry in the table directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableEntry {
    pub kind: TableKind,
    pub format: u32,
    pub size: u32,
    pub offset: u32,
}

impl TableEntry {
    /// The byte range of the table within the file.
    pub fn byte_range(&self) -> Range<u64> {
        let start = self.offset as u64;
        start..start + self.size as u64
    }
}

/// The directory entry as stored in the file: four little-endian words.
#[derive(Clone, Copy, bytemuck::AnyBitPattern)]
#[repr(C)]
struct RawEntry {
    kind: [u8; 4],
    format: [u8; 4],
    size: [u8; 4],
    offset: [u8; 4],
}

/// The table of contents of a PCF file.
///
/// Holds at most one entry per [`TableKind`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableDirectory {
    entries: [Option<TableEntry>; 9],
}

impl TableDirectory {
    /// Read and validate the header and directory.
    ///
    /// Directory entries whose type is not one of the known kinds are
    /// skipped.
    pub fn read<R: Read + Seek>(source: &mut R) -> Result<Self, ReadError> {
        let file_len = source_len(source)?;
        if file_len < MAGIC.len() as u64 {
            return Err(FormatError::BadMagic.into());
        }
        let mut cursor = Cursor::new(source, file_len)?;
        let mut magic = [0u8; 4];
        cursor.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(FormatError::BadMagic.into());
        }
        let count = cursor.read_u32()? as u64;
        if HEADER_LEN + count * ENTRY_LEN > file_len {
            return Err(FormatError::TruncatedDirectory.into());
        }
        let raw = cursor.read_vec((count * ENTRY_LEN) as usize)?;
        let raw_entries: &[RawEntry] =
            bytemuck::try_cast_slice(&raw).map_err(|_| FormatError::TruncatedDirectory)?;

        let mut directory = TableDirectory::default();
        for raw in raw_entries {
            let type_bits = u32::from_le_bytes(raw.kind);
            let Some(kind) = TableKind::from_type_bit(type_bits) else {
                log::debug!("skipping unknown table type 0x{type_bits:X}");
                continue;
            };
            let entry = TableEntry {
                kind,
                format: u32::from_le_bytes(raw.format),
                size: u32::from_le_bytes(raw.size),
                offset: u32::from_le_bytes(raw.offset),
            };
            if entry.byte_range().end > file_len {
                return Err(FormatError::TruncatedDirectory.into());
            }
            let slot = &mut directory.entries[kind.index()];
            if slot.is_some() {
                return Err(FormatError::DuplicateTable(kind).into());
            }
            *slot = Some(entry);
        }
        log::debug!(
            "read PCF directory: {} of {count} entries usable, {file_len} bytes",
            directory.len()
        );
        Ok(directory)
    }

    /// Returns the entry for `kind`, if present.
    pub fn get(&self, kind: TableKind) -> Option<&TableEntry> {
        self.entries[kind.index()].as_ref()
    }

    /// Returns the entry for `kind`, or an error if the table is missing.
    pub fn require(&self, kind: TableKind) -> Result<&TableEntry, FormatError> {
        self.get(kind).ok_or(FormatError::MissingTable(kind))
    }

    pub fn contains(&self, kind: TableKind) -> bool {
        self.get(kind).is_some()
    }

    /// Iterate over the present entries, ordered by kind.
    pub fn iter(&self) -> impl Iterator<Item = &TableEntry> + '_ {
        self.entries.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcf_test_data::{toc_entry_offset, SINGLE_GLYPH};
    use std::io::Cursor as IoCursor;

    fn read(data: &[u8]) -> Result<TableDirectory, ReadError> {
        TableDirectory::read(&mut IoCursor::new(data))
    }

    fn format_error(data: &[u8]) -> Option<FormatError> {
        read(data).err().and_then(|err| err.format_error())
    }

    #[test]
    fn type_bits() {
        for kind in TableKind::ALL {
            assert_eq!(TableKind::from_type_bit(kind.type_bit()), Some(kind));
        }
        assert_eq!(TableKind::BdfEncodings.type_bit(), 1 << 5);
        assert_eq!(TableKind::from_type_bit(0), None);
        assert_eq!(TableKind::from_type_bit(1 << 9), None);
        assert_eq!(TableKind::from_type_bit(0b11), None);
    }

    #[test]
    fn read_single_glyph_directory() {
        let directory = read(SINGLE_GLYPH).unwrap();
        assert_eq!(directory.len(), 4);
        assert_eq!(
            directory.get(TableKind::Bitmaps),
            Some(&TableEntry {
                kind: TableKind::Bitmaps,
                format: 0x0C,
                size: 29,
                offset: 140,
            })
        );
        assert!(directory.contains(TableKind::Accelerators));
        assert!(!directory.contains(TableKind::Properties));
        assert_eq!(
            directory.require(TableKind::Swidths),
            Err(FormatError::MissingTable(TableKind::Swidths))
        );
        let kinds: Vec<_> = directory.iter().map(|entry| entry.kind).collect();
        assert_eq!(
            kinds,
            [
                TableKind::Accelerators,
                TableKind::Metrics,
                TableKind::Bitmaps,
                TableKind::BdfEncodings
            ]
        );
    }

    #[test]
    fn bad_magic() {
        assert_eq!(
            format_error(&pcf_test_data::bad_magic()),
            Some(FormatError::BadMagic)
        );
        assert_eq!(format_error(b"\x01f"), Some(FormatError::BadMagic));
        assert_eq!(format_error(b""), Some(FormatError::BadMagic));
    }

    #[test]
    fn truncated_directory() {
        // header promises more entries than the file holds
        let mut data = SINGLE_GLYPH.to_vec();
        data[4] = 0x40;
        assert_eq!(format_error(&data), Some(FormatError::TruncatedDirectory));

        // missing table count
        assert_eq!(
            format_error(&SINGLE_GLYPH[..6]),
            Some(FormatError::TruncatedDirectory)
        );

        // last table extends past the end of the file
        assert_eq!(
            format_error(&SINGLE_GLYPH[..SINGLE_GLYPH.len() - 1]),
            Some(FormatError::TruncatedDirectory)
        );
    }

    #[test]
    fn duplicate_table() {
        // relabel the BITMAPS entry as METRICS
        let mut data = SINGLE_GLYPH.to_vec();
        data[toc_entry_offset(2)] = 0x04;
        assert_eq!(
            format_error(&data),
            Some(FormatError::DuplicateTable(TableKind::Metrics))
        );
    }

    #[test]
    fn unknown_tables_are_skipped() {
        let mut data = SINGLE_GLYPH.to_vec();
        data[toc_entry_offset(0)] = 0x00;
        data[toc_entry_offset(0) + 2] = 0x01;
        let directory = read(&data).unwrap();
        assert_eq!(directory.len(), 3);
        assert!(!directory.contains(TableKind::Accelerators));
    }
}
