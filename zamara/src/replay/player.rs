//! Player entries from `replay.details`

use super::types::{Difficulty, NamedColor, PlayerType, Race};
use crate::serialized::SerializedValue;

/// Player color as stored in the details file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Color {
    /// Alpha
    pub a: u8,
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
}

impl Color {
    /// Hex form, `#RRGGBB`
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// A player slot
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Player {
    /// Display name
    pub name: String,
    /// Battle.net id
    pub id: i64,
    /// Human or computer
    pub player_type: PlayerType,
    /// Team number
    pub team: i32,
    /// Color from the details file
    pub color: Color,
    /// Color picked in the lobby
    pub named_color: NamedColor,
    /// Race picked in the lobby
    pub chosen_race: Race,
    /// Race actually played
    pub actual_race: Race,
    /// AI difficulty
    pub difficulty: Difficulty,
    /// Handicap percentage
    pub handicap: i32,
    /// Game result code
    pub outcome: i32,
}

fn integer_at(value: &SerializedValue, path: &[usize]) -> Option<i64> {
    value.path(path).and_then(SerializedValue::as_i64)
}

fn color_component(value: &SerializedValue, index: usize) -> u8 {
    integer_at(value, &[3, index]).map_or(0, |component| component as u8)
}

impl Player {
    /// Build a player from its details entry
    ///
    /// Missing fields keep their defaults. Lobby attributes (type, chosen
    /// race, difficulty, named color) are filled in later from the
    /// attributes file.
    pub fn from_details(value: &SerializedValue) -> Self {
        let name = value
            .item(0)
            .and_then(SerializedValue::as_str)
            .unwrap_or_default()
            .to_string();
        let actual_race = value
            .item(2)
            .and_then(SerializedValue::as_str)
            .map_or(Race::Unknown, Race::from_details);

        Self {
            name,
            id: integer_at(value, &[1, 3]).unwrap_or(0),
            color: Color {
                a: color_component(value, 0),
                r: color_component(value, 1),
                g: color_component(value, 2),
                b: color_component(value, 3),
            },
            team: integer_at(value, &[5]).unwrap_or(0) as i32,
            handicap: integer_at(value, &[6]).unwrap_or(0) as i32,
            outcome: integer_at(value, &[8]).unwrap_or(0) as i32,
            actual_race,
            ..Self::default()
        }
    }
}
