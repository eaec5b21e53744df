//! Tagged serialized values
//!
//! StarCraft II stores structured replay metadata (`replay.details`,
//! `replay.initData`) as a recursive tree of tagged values. Every value starts
//! with a one-byte tag:
//!
//! | Tag    | Value        | Payload                                          |
//! |--------|--------------|--------------------------------------------------|
//! | `0x02` | String       | VarInt length, raw bytes                         |
//! | `0x04` | Array        | 2 reserved bytes, VarInt count, `count` values   |
//! | `0x05` | Keyed group  | VarInt count, `count` × (key byte, value)        |
//! | `0x06` | Int8         | 1 byte                                           |
//! | `0x07` | Int32        | 4 bytes, little-endian                           |
//! | `0x09` | VarInt       | 7-bit groups, little-endian, sign in the low bit |
//!
//! The size reported for a string is `length + 2` whatever the width of its
//! length prefix. Containers advance by the reported size, so a string longer
//! than 63 bytes shifts the parsing of the siblings that follow it. Existing
//! readers of the format behave the same way.

use crate::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};

/// Deepest container nesting accepted by [`decode`]
pub const MAX_NESTING_DEPTH: usize = 512;

/// Value type tags
pub mod tags {
    /// Length-prefixed string
    pub const STRING: u8 = 0x02;
    /// Array of values
    pub const ARRAY: u8 = 0x04;
    /// Group of values, each with a one-byte key
    pub const KEYED_GROUP: u8 = 0x05;
    /// Unsigned byte
    pub const INT8: u8 = 0x06;
    /// Unsigned 32-bit integer
    pub const INT32: u8 = 0x07;
    /// Variable-length signed integer
    pub const VAR_INT: u8 = 0x09;
}

/// A decoded value tree
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SerializedValue {
    /// Text; invalid UTF-8 is replaced
    String(String),
    /// Ordered children
    Array(Vec<SerializedValue>),
    /// Ordered children with their key bytes
    KeyedGroup(Vec<(u8, SerializedValue)>),
    /// Byte value
    Int8(i64),
    /// 32-bit value
    Int32(i64),
    /// Variable-length value
    VarInt(i64),
}

/// Decode one value from the start of `data`
///
/// Returns the value and the number of bytes it reports as consumed.
/// Trailing bytes are ignored. Trees nested deeper than
/// [`MAX_NESTING_DEPTH`] fail with [`Error::NestingTooDeep`].
pub fn decode(data: &[u8]) -> Result<(SerializedValue, usize)> {
    decode_at(data, 0, 0)
}

/// Decode a VarInt from the start of `data`
///
/// Returns the value and the number of bytes read. Groups beyond the 64th
/// bit are read but contribute nothing. The accumulated 64 bits are shifted
/// as a signed value, so encodings that set bit 63 decode as negative
/// magnitudes.
pub fn read_var_int(data: &[u8]) -> Result<(i64, usize)> {
    read_var_int_at(data, 0)
}

fn read_var_int_at(data: &[u8], offset: usize) -> Result<(i64, usize)> {
    let mut accumulator: u64 = 0;
    let mut shift: u32 = 0;
    let mut cursor = offset;

    loop {
        let byte = *data
            .get(cursor)
            .ok_or(Error::TruncatedValue { offset: cursor })?;
        cursor += 1;

        if shift < u64::BITS {
            accumulator = accumulator.wrapping_add(u64::from(byte & 0x7F) << shift);
        }
        shift = shift.saturating_add(7);

        if byte & 0x80 == 0 {
            break;
        }
    }

    // Signed shift: a set bit 63 carries into the magnitude
    let magnitude = (accumulator as i64) >> 1;
    let value = if accumulator & 1 == 1 {
        -magnitude
    } else {
        magnitude
    };

    Ok((value, cursor - offset))
}

fn checked_length(value: i64) -> Result<usize> {
    usize::try_from(value).map_err(|_| Error::InvalidLength(value))
}

fn bytes_at(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or(Error::TruncatedValue { offset })
}

fn decode_at(data: &[u8], offset: usize, depth: usize) -> Result<(SerializedValue, usize)> {
    if depth > MAX_NESTING_DEPTH {
        return Err(Error::NestingTooDeep { offset });
    }

    let tag = *data.get(offset).ok_or(Error::TruncatedValue { offset })?;
    let body = offset + 1;

    let (value, payload_size) = match tag {
        tags::STRING => {
            let (length, prefix_size) = read_var_int_at(data, body)?;
            let length = checked_length(length)?;
            let bytes = bytes_at(data, body + prefix_size, length)?;

            let value = SerializedValue::String(String::from_utf8_lossy(bytes).into_owned());
            (value, length + 1)
        }
        tags::ARRAY => {
            // Two reserved bytes precede the element count
            let mut cursor = body + 2;
            let (count, prefix_size) = read_var_int_at(data, cursor)?;
            let count = checked_length(count)?;
            cursor += prefix_size;

            let mut items = Vec::with_capacity(count.min(data.len()));
            for _ in 0..count {
                let (item, size) = decode_at(data, cursor, depth + 1)?;
                cursor += size;
                items.push(item);
            }

            (SerializedValue::Array(items), cursor - body)
        }
        tags::KEYED_GROUP => {
            let (count, prefix_size) = read_var_int_at(data, body)?;
            let count = checked_length(count)?;
            let mut cursor = body + prefix_size;

            let mut entries = Vec::with_capacity(count.min(data.len()));
            for _ in 0..count {
                let key = *data
                    .get(cursor)
                    .ok_or(Error::TruncatedValue { offset: cursor })?;
                cursor += 1;

                let (item, size) = decode_at(data, cursor, depth + 1)?;
                cursor += size;
                entries.push((key, item));
            }

            (SerializedValue::KeyedGroup(entries), cursor - body)
        }
        tags::INT8 => {
            let bytes = bytes_at(data, body, 1)?;
            (SerializedValue::Int8(i64::from(bytes[0])), 1)
        }
        tags::INT32 => {
            let bytes = bytes_at(data, body, 4)?;
            let value = LittleEndian::read_u32(bytes);
            (SerializedValue::Int32(i64::from(value)), 4)
        }
        tags::VAR_INT => {
            let (value, size) = read_var_int_at(data, body)?;
            (SerializedValue::VarInt(value), size)
        }
        tag => return Err(Error::UnknownValueTag { tag, offset }),
    };

    Ok((value, payload_size + 1))
}

impl SerializedValue {
    /// Type tag this value was decoded from
    pub fn tag(&self) -> u8 {
        match self {
            SerializedValue::String(_) => tags::STRING,
            SerializedValue::Array(_) => tags::ARRAY,
            SerializedValue::KeyedGroup(_) => tags::KEYED_GROUP,
            SerializedValue::Int8(_) => tags::INT8,
            SerializedValue::Int32(_) => tags::INT32,
            SerializedValue::VarInt(_) => tags::VAR_INT,
        }
    }

    /// Child at `index`, by position for both arrays and keyed groups
    pub fn item(&self, index: usize) -> Option<&SerializedValue> {
        match self {
            SerializedValue::Array(items) => items.get(index),
            SerializedValue::KeyedGroup(entries) => entries.get(index).map(|(_, item)| item),
            _ => None,
        }
    }

    /// Key byte of the keyed group child at `index`
    pub fn key(&self, index: usize) -> Option<u8> {
        match self {
            SerializedValue::KeyedGroup(entries) => entries.get(index).map(|&(key, _)| key),
            _ => None,
        }
    }

    /// Follow a sequence of child positions
    pub fn path(&self, indices: &[usize]) -> Option<&SerializedValue> {
        indices
            .iter()
            .try_fold(self, |value, &index| value.item(index))
    }

    /// Number of children, string bytes, or the integer width
    pub fn size(&self) -> usize {
        match self {
            SerializedValue::String(text) => text.len(),
            SerializedValue::Array(items) => items.len(),
            SerializedValue::KeyedGroup(entries) => entries.len(),
            SerializedValue::Int8(_) => 1,
            SerializedValue::Int32(_) => 4,
            SerializedValue::VarInt(_) => 8,
        }
    }

    /// Whether this is a string
    pub fn is_string(&self) -> bool {
        matches!(self, SerializedValue::String(_))
    }

    /// Whether this is an array
    pub fn is_array(&self) -> bool {
        matches!(self, SerializedValue::Array(_))
    }

    /// Whether this is a keyed group
    pub fn is_keyed_group(&self) -> bool {
        matches!(self, SerializedValue::KeyedGroup(_))
    }

    /// Whether this is an Int8
    pub fn is_int8(&self) -> bool {
        matches!(self, SerializedValue::Int8(_))
    }

    /// Whether this is an Int32
    pub fn is_int32(&self) -> bool {
        matches!(self, SerializedValue::Int32(_))
    }

    /// Whether this is a VarInt
    pub fn is_var_int(&self) -> bool {
        matches!(self, SerializedValue::VarInt(_))
    }

    /// Whether the value is any of the integer kinds
    pub fn is_integer(&self) -> bool {
        self.as_i64().is_some()
    }

    /// String contents
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SerializedValue::String(text) => Some(text),
            _ => None,
        }
    }

    /// Integer value of any integer kind
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            SerializedValue::Int8(value)
            | SerializedValue::Int32(value)
            | SerializedValue::VarInt(value) => Some(value),
            _ => None,
        }
    }

    /// Integer value truncated to 32 bits
    pub fn as_i32(&self) -> Option<i32> {
        self.as_i64().map(|value| value as i32)
    }

    /// Integer value truncated to 8 bits
    pub fn as_i8(&self) -> Option<i8> {
        self.as_i64().map(|value| value as i8)
    }
}
