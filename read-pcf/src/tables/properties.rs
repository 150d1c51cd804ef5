//! The PROPERTIES table

use std::io::{Read, Seek};

use crate::directory::{TableEntry, TableKind};
use crate::font_data::Cursor;
use crate::format::PCF_DEFAULT_FORMAT;
use crate::read::{FormatError, ReadError};

const RECORD_LEN: u64 = 9;

/// The value of a font property.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyValue {
    Integer(i32),
    String(String),
}

impl PropertyValue {
    pub fn as_integer(&self) -> Option<i32> {
        match self {
            PropertyValue::Integer(value) => Some(*value),
            PropertyValue::String(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(value) => Some(value),
            PropertyValue::Integer(_) => None,
        }
    }
}

/// Named font properties, in file order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Properties {
    entries: Vec<(String, PropertyValue)>,
}

impl Properties {
    pub fn read<R: Read + Seek>(source: &mut R, entry: &TableEntry) -> Result<Self, ReadError> {
        let (mut cursor, format) = Cursor::for_table(source, entry)?;
        format.expect_variant(&[PCF_DEFAULT_FORMAT])?;
        let count = cursor.read_i32()?;
        let count = u32::try_from(count).map_err(|_| malformed("negative property count"))?;
        cursor.ensure(count as u64 * RECORD_LEN)?;
        let mut records = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let name = cursor.read_i32()?;
            let is_string = cursor.read_u8()? != 0;
            let value = cursor.read_i32()?;
            records.push((name, is_string, value));
        }
        if count % 4 != 0 {
            let padding = 4 - count % 4;
            cursor.seek_to(cursor.position() + padding as u64)?;
        }
        let pool_size = cursor.read_i32()?;
        let pool_size =
            u32::try_from(pool_size).map_err(|_| malformed("negative string pool size"))?;
        let pool = cursor.read_vec(pool_size as usize)?;

        let entries = records
            .into_iter()
            .map(|(name, is_string, value)| {
                let name = pool_string(&pool, name)?;
                let value = if is_string {
                    PropertyValue::String(pool_string(&pool, value)?)
                } else {
                    PropertyValue::Integer(value)
                };
                Ok((name, value))
            })
            .collect::<Result<Vec<_>, FormatError>>()?;
        Ok(Properties { entries })
    }

    /// The value of the first property named `name`.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// The value of an integer property.
    pub fn integer(&self, name: &str) -> Option<i32> {
        self.get(name).and_then(PropertyValue::as_integer)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> + '_ {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn malformed(reason: &'static str) -> FormatError {
    FormatError::Malformed {
        kind: TableKind::Properties,
        reason,
    }
}

/// Read the NUL terminated string at `offset` in the string pool.
fn pool_string(pool: &[u8], offset: i32) -> Result<String, FormatError> {
    let tail = usize::try_from(offset)
        .ok()
        .and_then(|offset| pool.get(offset..))
        .ok_or_else(|| malformed("string offset outside the string pool"))?;
    let end = tail
        .iter()
        .position(|byte| *byte == 0)
        .ok_or_else(|| malformed("unterminated string"))?;
    Ok(String::from_utf8_lossy(&tail[..end]).into_owned())
}
