//! StarCraft II replay metadata
//!
//! A replay is an MPQ archive (behind a user data block) holding, among
//! others, `replay.details` (a serialized value tree with the map, time and
//! player roster) and `replay.attributes.events` (lobby settings).

mod attributes;
mod player;
mod types;

pub use attributes::{ids, parse_attributes, Attribute, ATTRIBUTE_RECORD_SIZE, GLOBAL_PLAYER};
pub use player::{Color, Player};
pub use types::{Difficulty, GameCategory, GameSpeed, GameType, NamedColor, PlayerType, Race};

use crate::archive::Archive;
use crate::serialized::{self, SerializedValue};
use crate::{Error, Result};
use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// Archive file with the map, time and roster
pub const DETAILS_FILE: &str = "replay.details";

/// Archive file with the lobby attributes
pub const ATTRIBUTES_FILE: &str = "replay.attributes.events";

/// Windows FILETIME of the Unix epoch, as the replay writer computes it
const FILETIME_UNIX_EPOCH: i64 = 116_444_735_995_904_000;

/// FILETIME and timezone values count 100ns intervals
const TICKS_PER_SECOND: i64 = 10_000_000;

/// Decoded replay metadata
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Replay {
    /// Map name
    pub map_name: String,
    /// Game start, labelled with the recording machine's UTC offset
    pub timestamp: DateTime<FixedOffset>,
    /// Team layout
    pub game_type: GameType,
    /// Game speed
    pub game_speed: GameSpeed,
    /// Lobby category
    pub game_category: GameCategory,
    /// Player slots in details order
    pub players: Vec<Player>,
}

impl Replay {
    /// Read a replay from a seekable source
    pub fn new<R: Read + Seek>(source: R) -> Result<Self> {
        let mut archive = Archive::open(source)?;
        Self::from_archive(&mut archive)
    }

    /// Read a replay file from disk
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }

    /// Read the details and attributes files of an open archive
    ///
    /// The details file is required. A replay whose attributes file is
    /// missing or malformed keeps the `Unknown` lobby settings.
    pub fn from_archive<R: Read + Seek>(archive: &mut Archive<R>) -> Result<Self> {
        let details = archive.read_file(DETAILS_FILE)?;
        let (root, _) = serialized::decode(&details)?;
        let mut replay = Self::from_details(&root)?;

        match archive
            .read_file(ATTRIBUTES_FILE)
            .and_then(|data| parse_attributes(&data))
        {
            Ok(attributes) => replay.apply_attributes(&attributes),
            Err(Error::FileNotFound(name)) => {
                log::warn!("Replay has no {}, lobby settings unknown", name);
            }
            Err(e) => {
                log::warn!("Ignoring unreadable {}: {}", ATTRIBUTES_FILE, e);
            }
        }

        Ok(replay)
    }

    /// Build a replay from a decoded details tree
    pub fn from_details(root: &SerializedValue) -> Result<Self> {
        let players = root
            .item(0)
            .map(|roster| {
                (0..roster.size())
                    .filter_map(|index| roster.item(index))
                    .map(Player::from_details)
                    .collect()
            })
            .unwrap_or_default();

        let map_name = root
            .item(1)
            .and_then(SerializedValue::as_str)
            .unwrap_or_default()
            .to_string();

        let filetime = root.item(5).and_then(SerializedValue::as_i64).unwrap_or(0);
        let tz_offset = root.item(6).and_then(SerializedValue::as_i64).unwrap_or(0);

        Ok(Self {
            map_name,
            timestamp: timestamp_from_filetime(filetime, tz_offset)?,
            game_type: GameType::Unknown,
            game_speed: GameSpeed::Unknown,
            game_category: GameCategory::Unknown,
            players,
        })
    }

    /// Apply lobby attributes to the game settings and player slots
    pub fn apply_attributes(&mut self, attributes: &[Attribute]) {
        for attribute in attributes {
            if attribute.is_global() {
                self.apply_global_attribute(attribute);
            } else {
                self.apply_player_attribute(attribute);
            }
        }
    }

    fn apply_global_attribute(&mut self, attribute: &Attribute) {
        let code = attribute.string_value.as_str();
        match attribute.id {
            ids::GAME_TYPE => self.game_type = GameType::from_code(code),
            ids::GAME_SPEED => self.game_speed = GameSpeed::from_code(code),
            ids::GAME_CATEGORY => self.game_category = GameCategory::from_code(code),
            _ => {}
        }
    }

    fn apply_player_attribute(&mut self, attribute: &Attribute) {
        let slot = usize::from(attribute.player).checked_sub(1);
        let Some(player) = slot.and_then(|index| self.players.get_mut(index)) else {
            log::warn!(
                "Attribute 0x{:04X} for player slot {} outside the roster of {}",
                attribute.id,
                attribute.player,
                self.players.len()
            );
            return;
        };

        let code = attribute.string_value.as_str();
        match attribute.id {
            ids::PLAYER_TYPE => player.player_type = PlayerType::from_code(code),
            ids::CHOSEN_RACE => player.chosen_race = Race::from_code(code),
            ids::DIFFICULTY => player.difficulty = Difficulty::from_code(code),
            ids::NAMED_COLOR => player.named_color = NamedColor::from_code(code),
            _ => {}
        }
    }
}

/// Convert a FILETIME and timezone bias (both in 100ns units)
///
/// The clock fields are taken from UTC and labelled with the offset, which
/// is how the replay writer stores local time.
fn timestamp_from_filetime(filetime: i64, tz_offset: i64) -> Result<DateTime<FixedOffset>> {
    let seconds = filetime.saturating_sub(FILETIME_UNIX_EPOCH) / TICKS_PER_SECOND;
    let utc = DateTime::from_timestamp(seconds, 0).ok_or(Error::InvalidTimestamp(filetime))?;

    let offset = i32::try_from(tz_offset / TICKS_PER_SECOND)
        .ok()
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| {
            log::warn!("Ignoring out of range timezone offset {}", tz_offset);
            Utc.fix()
        });

    offset
        .from_local_datetime(&utc.naive_utc())
        .single()
        .ok_or(Error::InvalidTimestamp(filetime))
}
