//! Synthetic replay archives and serialized values for integration tests

#![allow(dead_code)]

use bzip2::write::BzEncoder;
use bzip2::Compression;
use std::io::Write;
use zamara::crypto::{encrypt_block, hash_string, HashType, BLOCK_TABLE_SEED, HASH_TABLE_SEED};
use zamara::replay::ids;
use zamara::SerializedValue;

/// The files every replay archive carries
pub const REPLAY_FILES: [&str; 8] = [
    "replay.attributes.events",
    "replay.details",
    "replay.game.events",
    "replay.initData",
    "replay.load.info",
    "replay.message.events",
    "replay.smartcam.events",
    "replay.sync.events",
];

const HEADER_SIZE: usize = 44;
const EMPTY: u32 = 0xFFFF_FFFF;

/// How a fixture file is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// Type byte 0x00, then the content
    Stored,
    /// Type byte 0x10, then a BZip2 stream
    BZip2,
    /// Content only; its first byte must not look like a type byte
    Unmarked,
}

#[derive(Debug, Clone)]
struct FixtureFile {
    name: String,
    content: Vec<u8>,
    storage: Storage,
}

/// Builds MPQ archives laid out the way StarCraft II writes replays
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    user_data: Option<(u32, u32, Vec<u8>)>,
    files: Vec<FixtureFile>,
    write_listfile: bool,
    hash_table_size: u32,
    tables_at: Option<usize>,
    raw_hash_entries: Vec<(String, u32)>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            user_data: None,
            files: Vec::new(),
            write_listfile: true,
            hash_table_size: 16,
            tables_at: None,
            raw_hash_entries: Vec::new(),
        }
    }

    /// Prefix the archive with a user data block
    pub fn user_data(mut self, max_size: u32, archive_offset: u32, data: &[u8]) -> Self {
        self.user_data = Some((max_size, archive_offset, data.to_vec()));
        self
    }

    pub fn file(mut self, name: &str, content: impl Into<Vec<u8>>, storage: Storage) -> Self {
        let content = content.into();
        if storage == Storage::Unmarked {
            assert!(
                !matches!(content.first(), Some(0x00) | Some(0x10)),
                "unmarked content would be read as a type byte"
            );
        }
        self.files.push(FixtureFile {
            name: name.to_string(),
            content,
            storage,
        });
        self
    }

    pub fn without_listfile(mut self) -> Self {
        self.write_listfile = false;
        self
    }

    /// Number of hash table slots (a power of two)
    pub fn hash_table_size(mut self, size: u32) -> Self {
        assert!(size.is_power_of_two());
        self.hash_table_size = size;
        self
    }

    /// Pad the file data so the hash table starts at `offset`
    pub fn tables_at(mut self, offset: usize) -> Self {
        self.tables_at = Some(offset);
        self
    }

    /// Add a hash entry for `name` pointing at an arbitrary block
    pub fn raw_hash_entry(mut self, name: &str, block_index: u32) -> Self {
        self.raw_hash_entries.push((name.to_string(), block_index));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut files = self.files.clone();
        if self.write_listfile {
            let listing: String = files
                .iter()
                .filter(|file| !file.name.starts_with('('))
                .map(|file| format!("{}\r\n", file.name))
                .collect();
            files.insert(
                0,
                FixtureFile {
                    name: "(listfile)".to_string(),
                    content: listing.into_bytes(),
                    storage: Storage::Stored,
                },
            );
        }

        let mut body = vec![0u8; HEADER_SIZE];
        let mut blocks: Vec<u32> = Vec::new();
        for file in &files {
            let position = body.len() as u32;
            let stored = store(file);
            let flags = match file.storage {
                Storage::BZip2 => 0x8100_0200,
                _ => 0x8100_0000,
            };
            body.extend_from_slice(&stored);
            blocks.extend([position, stored.len() as u32, file.content.len() as u32, flags]);
        }

        if let Some(offset) = self.tables_at {
            assert!(body.len() <= offset, "file data overlaps the tables");
            body.resize(offset, 0);
        }

        let slot_count = self.hash_table_size as usize;
        let mut slots = vec![[EMPTY; 4]; slot_count];
        let entries = files
            .iter()
            .enumerate()
            .map(|(index, file)| (file.name.clone(), index as u32))
            .chain(self.raw_hash_entries.iter().cloned());
        for (name, block_index) in entries {
            let mut slot = hash_string(&name, HashType::TableOffset) as usize % slot_count;
            let mut steps = 0;
            while slots[slot][3] != EMPTY {
                slot = (slot + 1) % slot_count;
                steps += 1;
                assert!(steps < slot_count, "hash table is full");
            }
            slots[slot] = [
                hash_string(&name, HashType::NameA),
                hash_string(&name, HashType::NameB),
                0,
                block_index,
            ];
        }

        let hash_table_offset = body.len() as u32;
        let mut hash_words: Vec<u32> = slots.iter().flatten().copied().collect();
        encrypt_block(&mut hash_words, hash_string(HASH_TABLE_SEED, HashType::FileKey));
        body.extend(hash_words.iter().flat_map(|word| word.to_le_bytes()));

        let block_table_offset = body.len() as u32;
        encrypt_block(&mut blocks, hash_string(BLOCK_TABLE_SEED, HashType::FileKey));
        body.extend(blocks.iter().flat_map(|word| word.to_le_bytes()));

        let mut header = Vec::with_capacity(HEADER_SIZE);
        header.extend_from_slice(b"MPQ\x1A");
        header.extend_from_slice(&(HEADER_SIZE as u32).to_le_bytes());
        header.extend_from_slice(&(body.len() as u32).to_le_bytes());
        header.extend_from_slice(&1u16.to_le_bytes());
        header.extend_from_slice(&3u16.to_le_bytes());
        header.extend_from_slice(&hash_table_offset.to_le_bytes());
        header.extend_from_slice(&block_table_offset.to_le_bytes());
        header.extend_from_slice(&(slot_count as u32).to_le_bytes());
        header.extend_from_slice(&(files.len() as u32).to_le_bytes());
        header.extend_from_slice(&0u64.to_le_bytes());
        header.extend_from_slice(&0u16.to_le_bytes());
        header.extend_from_slice(&0u16.to_le_bytes());
        body[..HEADER_SIZE].copy_from_slice(&header);

        match self.user_data {
            Some((max_size, archive_offset, data)) => {
                let mut out = Vec::new();
                out.extend_from_slice(b"MPQ\x1B");
                out.extend_from_slice(&max_size.to_le_bytes());
                out.extend_from_slice(&archive_offset.to_le_bytes());
                out.extend_from_slice(&(data.len() as u32).to_le_bytes());
                out.extend_from_slice(&data);
                assert!(out.len() <= archive_offset as usize);
                out.resize(archive_offset as usize, 0);
                out.extend_from_slice(&body);
                out
            }
            None => body,
        }
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn store(file: &FixtureFile) -> Vec<u8> {
    match file.storage {
        Storage::Stored => {
            let mut stored = vec![0x00];
            stored.extend_from_slice(&file.content);
            stored
        }
        Storage::BZip2 => {
            let mut stored = vec![0x10];
            stored.extend(bzip2_compress(&file.content));
            stored
        }
        Storage::Unmarked => file.content.clone(),
    }
}

pub fn bzip2_compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = BzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Game events stand-in: long enough to need several reads
pub fn game_events() -> Vec<u8> {
    (0..6000u32).map(|i| (i % 251) as u8).collect()
}

/// Attribute records stand-in for the `(attributes)` special file
pub fn special_attributes() -> Vec<u8> {
    let mut data = vec![0x64, 0x00, 0x00, 0x00, 0x0F, 0x00, 0x00, 0x00];
    data.extend(std::iter::repeat(0xAB).take(40));
    data
}

/// Serialized value encoder, the inverse of `zamara::serialized::decode`
pub fn encode(value: &SerializedValue) -> Vec<u8> {
    let mut out = Vec::new();
    encode_into(value, &mut out);
    out
}

pub fn encode_var_int(value: i64) -> Vec<u8> {
    let mut accumulator = (value.unsigned_abs() << 1) | u64::from(value < 0);
    let mut out = Vec::new();
    loop {
        let byte = (accumulator & 0x7F) as u8;
        accumulator >>= 7;
        if accumulator == 0 {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }
}

fn encode_into(value: &SerializedValue, out: &mut Vec<u8>) {
    match value {
        SerializedValue::String(text) => {
            out.push(0x02);
            out.extend(encode_var_int(text.len() as i64));
            out.extend_from_slice(text.as_bytes());
        }
        SerializedValue::Array(items) => {
            out.extend_from_slice(&[0x04, 0x01, 0x00]);
            out.extend(encode_var_int(items.len() as i64));
            for item in items {
                encode_into(item, out);
            }
        }
        SerializedValue::KeyedGroup(entries) => {
            out.push(0x05);
            out.extend(encode_var_int(entries.len() as i64));
            for (key, item) in entries {
                out.push(*key);
                encode_into(item, out);
            }
        }
        SerializedValue::Int8(value) => out.extend_from_slice(&[0x06, *value as u8]),
        SerializedValue::Int32(value) => {
            out.push(0x07);
            out.extend_from_slice(&(*value as u32).to_le_bytes());
        }
        SerializedValue::VarInt(value) => {
            out.push(0x09);
            out.extend(encode_var_int(*value));
        }
    }
}

fn text(value: &str) -> SerializedValue {
    SerializedValue::String(value.to_string())
}

fn int(value: i64) -> SerializedValue {
    SerializedValue::VarInt(value)
}

fn keyed(values: Vec<SerializedValue>) -> SerializedValue {
    SerializedValue::KeyedGroup(
        values
            .into_iter()
            .enumerate()
            .map(|(key, value)| (key as u8, value))
            .collect(),
    )
}

/// One details roster entry
pub struct DetailsPlayer {
    pub name: &'static str,
    pub id: i64,
    pub race: &'static str,
    pub argb: [i64; 4],
    pub team: i64,
    pub handicap: i64,
    pub outcome: i64,
}

/// The four-player 2v2 roster on Discord IV
pub const PLAYERS: [DetailsPlayer; 4] = [
    DetailsPlayer {
        name: "TehPartE",
        id: 278960,
        race: "Protoss",
        argb: [255, 180, 20, 30],
        team: 0,
        handicap: 100,
        outcome: 0,
    },
    DetailsPlayer {
        name: "totsgerber",
        id: 297523,
        race: "Zerg",
        argb: [255, 0, 66, 255],
        team: 1,
        handicap: 100,
        outcome: 0,
    },
    DetailsPlayer {
        name: "David",
        id: 549011,
        race: "Terran",
        argb: [255, 28, 167, 234],
        team: 1,
        handicap: 100,
        outcome: 0,
    },
    DetailsPlayer {
        name: "Steven",
        id: 752194,
        race: "Terran",
        argb: [255, 84, 0, 129],
        team: 0,
        handicap: 0,
        outcome: 0,
    },
];

pub const MAP_NAME: &str = "Discord IV";
pub const FILETIME: i64 = 129250222145273475;
pub const TIMEZONE_OFFSET: i64 = -144000000000;

fn details_player(player: &DetailsPlayer) -> SerializedValue {
    let toon = SerializedValue::KeyedGroup(vec![
        (0, int(2)),
        (1, text("S2")),
        (2, int(1)),
        (4, int(player.id)),
    ]);

    keyed(vec![
        text(player.name),
        toon,
        text(player.race),
        keyed(player.argb.iter().map(|&component| int(component)).collect()),
        int(2),
        int(player.team),
        int(player.handicap),
        int(0),
        int(player.outcome),
    ])
}

/// The decoded `replay.details` tree
pub fn details() -> SerializedValue {
    keyed(vec![
        SerializedValue::Array(PLAYERS.iter().map(details_player).collect()),
        text(MAP_NAME),
        text(""),
        keyed(vec![text("Minimap.tga")]),
        SerializedValue::Int8(0),
        int(FILETIME),
        int(TIMEZONE_OFFSET),
        text(""),
        SerializedValue::Array(Vec::new()),
        SerializedValue::Int32(7),
    ])
}

fn attribute_record(id: u32, player: u8, code: &str) -> Vec<u8> {
    let mut value = [0u8; 4];
    value[..code.len()].copy_from_slice(code.as_bytes());
    value.reverse();

    let mut record = Vec::with_capacity(13);
    record.extend_from_slice(&0x3E7u32.to_le_bytes());
    record.extend_from_slice(&id.to_le_bytes());
    record.push(player);
    record.extend_from_slice(&value);
    record
}

/// The `replay.attributes.events` file for the 2v2 roster
pub fn attributes() -> Vec<u8> {
    let mut records = vec![
        attribute_record(ids::GAME_TYPE, 0x10, "2v2"),
        attribute_record(ids::GAME_SPEED, 0x10, "Fasr"),
        attribute_record(ids::GAME_CATEGORY, 0x10, "Amm"),
    ];
    let races = ["Prot", "Zerg", "Terr", "Terr"];
    let colors = ["tc01", "tc02", "tc03", "tc04"];
    for slot in 0..4 {
        let player = slot as u8 + 1;
        records.push(attribute_record(ids::PLAYER_TYPE, player, "Humn"));
        records.push(attribute_record(ids::CHOSEN_RACE, player, races[slot]));
        records.push(attribute_record(ids::DIFFICULTY, player, "Medi"));
        records.push(attribute_record(ids::NAMED_COLOR, player, colors[slot]));
        records.push(attribute_record(ids::HANDICAP, player, "d"));
    }
    // A slot with no player in the roster
    records.push(attribute_record(ids::PLAYER_TYPE, 7, "Open"));

    let mut data = vec![0x00, 0x00, 0x00, 0x00, 0x00];
    data.extend_from_slice(&(records.len() as u32).to_le_bytes());
    for record in records {
        data.extend(record);
    }
    data
}

/// Contents of the 8 replay files, in `REPLAY_FILES` order
pub fn replay_file_contents() -> Vec<(&'static str, Vec<u8>, Storage)> {
    vec![
        (REPLAY_FILES[0], attributes(), Storage::Stored),
        (REPLAY_FILES[1], encode(&details()), Storage::BZip2),
        (REPLAY_FILES[2], game_events(), Storage::BZip2),
        (REPLAY_FILES[3], b"\x05\x02\x00\x02\x08Discord".to_vec(), Storage::Unmarked),
        (REPLAY_FILES[4], b"load info".to_vec(), Storage::Stored),
        (REPLAY_FILES[5], b"gl hf".repeat(30), Storage::BZip2),
        (REPLAY_FILES[6], vec![0x01, 0x02, 0x03, 0x04], Storage::Stored),
        (REPLAY_FILES[7], Vec::new(), Storage::Stored),
    ]
}

/// A complete replay laid out like the reference capture:
/// user data (512, 1024, 60), tables at 108596 and 108852, 10 blocks.
pub fn replay_archive() -> Vec<u8> {
    let mut builder = ArchiveBuilder::new()
        .user_data(512, 1024, &[0x5A; 60])
        .file("(attributes)", special_attributes(), Storage::Unmarked)
        .tables_at(108596);

    for (name, content, storage) in replay_file_contents() {
        builder = builder.file(name, content, storage);
    }

    builder.build()
}
