//! The `replay.attributes.events` file

use crate::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};

/// Size of one attribute record
pub const ATTRIBUTE_RECORD_SIZE: usize = 13;

/// Player slot value marking a game-wide attribute
pub const GLOBAL_PLAYER: u8 = 0x10;

/// Attribute ids
pub mod ids {
    /// Team layout (global)
    pub const GAME_TYPE: u32 = 0x07D1;
    /// Game speed (global)
    pub const GAME_SPEED: u32 = 0x0BB8;
    /// Lobby category (global)
    pub const GAME_CATEGORY: u32 = 0x0BC1;

    /// Human or computer (player)
    pub const PLAYER_TYPE: u32 = 0x01F4;
    /// Race picked in the lobby (player)
    pub const CHOSEN_RACE: u32 = 0x0BB9;
    /// Team color (player)
    pub const NAMED_COLOR: u32 = 0x0BBA;
    /// Handicap (player); the details file value is used instead
    pub const HANDICAP: u32 = 0x0BBB;
    /// AI difficulty (player)
    pub const DIFFICULTY: u32 = 0x0BBC;
}

/// One lobby attribute
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Attribute {
    /// Record header
    pub header: u32,
    /// Attribute id, see [`ids`]
    pub id: u32,
    /// Player slot (1-based), or [`GLOBAL_PLAYER`]
    pub player: u8,
    /// The four value bytes as a little-endian integer
    pub value: u32,
    /// The four value bytes as text
    pub string_value: String,
}

impl Attribute {
    /// Decode a 13-byte record
    pub fn from_bytes(data: &[u8; ATTRIBUTE_RECORD_SIZE]) -> Self {
        let value_bytes = &data[0x09..0x0D];

        Self {
            header: LittleEndian::read_u32(&data[0x00..]),
            id: LittleEndian::read_u32(&data[0x04..]),
            player: data[0x08],
            value: LittleEndian::read_u32(value_bytes),
            string_value: attribute_string(value_bytes),
        }
    }

    /// Whether the attribute applies to the whole game
    pub fn is_global(&self) -> bool {
        self.player == GLOBAL_PLAYER
    }

    /// Whether the attribute applies to one player slot
    pub fn is_player(&self) -> bool {
        !self.is_global()
    }
}

/// Value bytes are stored reversed and NUL padded
fn attribute_string(bytes: &[u8]) -> String {
    let reversed: Vec<u8> = bytes.iter().rev().copied().collect();
    String::from_utf8_lossy(&reversed)
        .replace('\0', "")
        .trim()
        .to_string()
}

/// Parse an attributes file
///
/// Leading zero bytes are skipped, then a little-endian record count is read
/// followed by that many fixed-size records.
pub fn parse_attributes(data: &[u8]) -> Result<Vec<Attribute>> {
    let start = data
        .iter()
        .position(|&byte| byte != 0)
        .ok_or(Error::TruncatedValue { offset: data.len() })?;

    let count_bytes = data
        .get(start..start + 4)
        .ok_or(Error::TruncatedValue { offset: start })?;
    let count = LittleEndian::read_u32(count_bytes) as usize;

    let records = &data[start + 4..];
    let needed = count.saturating_mul(ATTRIBUTE_RECORD_SIZE);
    if records.len() < needed {
        return Err(Error::TruncatedValue {
            offset: start + 4 + records.len() / ATTRIBUTE_RECORD_SIZE * ATTRIBUTE_RECORD_SIZE,
        });
    }

    let attributes: Vec<Attribute> = records[..needed]
        .chunks_exact(ATTRIBUTE_RECORD_SIZE)
        .filter_map(|chunk| chunk.try_into().ok())
        .map(Attribute::from_bytes)
        .collect();

    log::debug!("Parsed {} replay attributes", attributes.len());
    Ok(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u32, player: u8, value: &[u8; 4]) -> Vec<u8> {
        let mut data = Vec::with_capacity(ATTRIBUTE_RECORD_SIZE);
        data.extend_from_slice(&0x3E7u32.to_le_bytes());
        data.extend_from_slice(&id.to_le_bytes());
        data.push(player);
        data.extend_from_slice(value);
        data
    }

    #[test]
    fn test_attribute_string() {
        assert_eq!(attribute_string(b"nmuH"), "Humn");
        assert_eq!(attribute_string(b"\0mmA"), "Amm");
        assert_eq!(attribute_string(b"\02v2"), "2v2");
        assert_eq!(attribute_string(b"\0\0\0\0"), "");
        assert_eq!(attribute_string(b" \0\0\x41"), "A");
    }

    #[test]
    fn test_parse_attributes() {
        let mut data = vec![0x00, 0x00, 0x00, 0x00, 0x00];
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend(record(ids::GAME_SPEED, GLOBAL_PLAYER, b"rsaF"));
        data.extend(record(ids::PLAYER_TYPE, 1, b"nmuH"));

        let attributes = parse_attributes(&data).unwrap();

        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes[0].header, 0x3E7);
        assert_eq!(attributes[0].id, ids::GAME_SPEED);
        assert!(attributes[0].is_global());
        assert_eq!(attributes[0].string_value, "Fasr");
        assert_eq!(attributes[1].player, 1);
        assert!(attributes[1].is_player());
        assert_eq!(attributes[1].value, u32::from_le_bytes(*b"nmuH"));
        assert_eq!(attributes[1].string_value, "Humn");
    }

    #[test]
    fn test_parse_truncated_records() {
        let mut data = 3u32.to_le_bytes().to_vec();
        data.extend(record(ids::GAME_TYPE, GLOBAL_PLAYER, b"\02v2"));
        data.extend(&[0u8; 5]);

        assert!(matches!(
            parse_attributes(&data),
            Err(Error::TruncatedValue { offset: 17 })
        ));
    }

    #[test]
    fn test_parse_all_zero() {
        assert!(matches!(
            parse_attributes(&[0u8; 8]),
            Err(Error::TruncatedValue { offset: 8 })
        ));
    }

    #[test]
    fn test_parse_short_count() {
        assert!(matches!(
            parse_attributes(&[0x00, 0x01, 0x00]),
            Err(Error::TruncatedValue { offset: 1 })
        ));
    }
}
