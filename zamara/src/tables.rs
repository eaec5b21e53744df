//! MPQ directory tables (hash and block)

use crate::crypto::{hash_string, BlockCipher, HashType, BLOCK_TABLE_SEED, HASH_TABLE_SEED};
use crate::stream::read_exact_vec;
use crate::{Error, Result};
use bitflags::bitflags;
use byteorder::{ByteOrder, LittleEndian};
use std::io::{Read, Seek, SeekFrom};

/// Size of one hash or block table record
pub const TABLE_ENTRY_SIZE: usize = 16;

/// Hash table entry (16 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HashEntry {
    /// The hash of the full file name (part A)
    pub file_path_hash_a: u32,
    /// The hash of the full file name (part B)
    pub file_path_hash_b: u32,
    /// The language of the file (Windows LANGID)
    pub language: u16,
    /// The platform the file is used for
    pub platform: u16,
    /// Block table index or special value
    pub block_index: u32,
}

impl HashEntry {
    /// Value indicating the hash entry has never been used
    pub const EMPTY_NEVER_USED: u32 = 0xFFFF_FFFF;
    /// Value indicating the hash entry was deleted
    pub const EMPTY_DELETED: u32 = 0xFFFF_FFFE;

    /// Parse an entry from a decrypted 16-byte record
    pub fn from_bytes(data: &[u8; TABLE_ENTRY_SIZE]) -> Self {
        Self {
            file_path_hash_a: LittleEndian::read_u32(&data[0x00..]),
            file_path_hash_b: LittleEndian::read_u32(&data[0x04..]),
            language: LittleEndian::read_u16(&data[0x08..]),
            platform: LittleEndian::read_u16(&data[0x0A..]),
            block_index: LittleEndian::read_u32(&data[0x0C..]),
        }
    }

    /// Check if this entry has never been used
    pub fn is_empty(&self) -> bool {
        self.block_index == Self::EMPTY_NEVER_USED
    }

    /// Check if this entry was deleted
    pub fn is_deleted(&self) -> bool {
        self.block_index == Self::EMPTY_DELETED
    }

    /// Whether the entry carries the fingerprint of `filename`
    pub fn matches(&self, hash_a: u32, hash_b: u32) -> bool {
        self.file_path_hash_a == hash_a && self.file_path_hash_b == hash_b
    }
}

bitflags! {
    /// Block table entry flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize))]
    pub struct BlockFlags: u32 {
        /// File is compressed using PKWARE Data compression library
        const IMPLODE = 0x0000_0100;
        /// File is compressed using one or more compression methods
        const COMPRESS = 0x0000_0200;
        /// File is encrypted
        const ENCRYPTED = 0x0001_0000;
        /// The decryption key for the file is adjusted by the block position
        const FIX_KEY = 0x0002_0000;
        /// The file is a patch file
        const PATCH_FILE = 0x0010_0000;
        /// File is stored as a single unit, not split into sectors
        const SINGLE_UNIT = 0x0100_0000;
        /// File is a deletion marker
        const DELETE_MARKER = 0x0200_0000;
        /// File has a CRC for each sector
        const SECTOR_CRC = 0x0400_0000;
        /// File exists
        const EXISTS = 0x8000_0000;
    }
}

/// Block table entry (16 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BlockEntry {
    /// Offset of the file data, relative to the archive start
    pub file_position: u32,
    /// Compressed file size
    pub compressed_size: u32,
    /// Size of uncompressed file
    pub file_size: u32,
    /// Raw flag bits
    pub flags: u32,
}

impl BlockEntry {
    /// Parse an entry from a decrypted 16-byte record
    pub fn from_bytes(data: &[u8; TABLE_ENTRY_SIZE]) -> Self {
        Self {
            file_position: LittleEndian::read_u32(&data[0x00..]),
            compressed_size: LittleEndian::read_u32(&data[0x04..]),
            file_size: LittleEndian::read_u32(&data[0x08..]),
            flags: LittleEndian::read_u32(&data[0x0C..]),
        }
    }

    /// Known flag bits; unknown bits are dropped
    pub fn block_flags(&self) -> BlockFlags {
        BlockFlags::from_bits_truncate(self.flags)
    }

    /// Check if the file exists
    pub fn exists(&self) -> bool {
        self.block_flags().contains(BlockFlags::EXISTS)
    }

    /// Check if the file is compressed
    pub fn is_compressed(&self) -> bool {
        self.block_flags()
            .intersects(BlockFlags::COMPRESS | BlockFlags::IMPLODE)
    }

    /// Check if the file is encrypted
    pub fn is_encrypted(&self) -> bool {
        self.block_flags().contains(BlockFlags::ENCRYPTED)
    }
}

/// Read `count` records at `position` and decrypt them with `seed`
fn read_encrypted_records<R: Read + Seek>(
    reader: &mut R,
    position: u64,
    count: u32,
    seed: &str,
) -> Result<Vec<u8>> {
    let byte_size = (count as usize)
        .checked_mul(TABLE_ENTRY_SIZE)
        .ok_or_else(|| Error::InvalidHeader(format!("table entry count {} too large", count)))?;

    reader.seek(SeekFrom::Start(position))?;
    let mut raw_data = read_exact_vec(reader, byte_size as u64)?;

    BlockCipher::new(seed, HashType::FileKey).decrypt(&mut raw_data)?;

    Ok(raw_data)
}

/// Split a decrypted table into fixed-size records
fn records(data: &[u8]) -> impl Iterator<Item = &[u8; TABLE_ENTRY_SIZE]> {
    data.chunks_exact(TABLE_ENTRY_SIZE)
        .filter_map(|chunk| chunk.try_into().ok())
}

/// Hash table
#[derive(Debug, Clone, Default)]
pub struct HashTable {
    entries: Vec<HashEntry>,
}

impl HashTable {
    /// Read and decrypt a hash table from the archive
    pub fn read<R: Read + Seek>(reader: &mut R, position: u64, count: u32) -> Result<Self> {
        let raw_data = read_encrypted_records(reader, position, count, HASH_TABLE_SEED)?;
        Ok(Self::from_decrypted(&raw_data))
    }

    /// Parse an already decrypted table
    pub fn from_decrypted(data: &[u8]) -> Self {
        Self {
            entries: records(data).map(HashEntry::from_bytes).collect(),
        }
    }

    /// Get all entries
    pub fn entries(&self) -> &[HashEntry] {
        &self.entries
    }

    /// Get a specific entry
    pub fn get(&self, index: usize) -> Option<&HashEntry> {
        self.entries.get(index)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the entry for a file name
    ///
    /// Scans every entry and returns the first whose fingerprint matches.
    /// Sentinel block indices are not special-cased.
    pub fn find(&self, filename: &str) -> Option<&HashEntry> {
        let hash_a = hash_string(filename, HashType::NameA);
        let hash_b = hash_string(filename, HashType::NameB);

        self.entries
            .iter()
            .find(|entry| entry.matches(hash_a, hash_b))
    }
}

/// Block table
#[derive(Debug, Clone, Default)]
pub struct BlockTable {
    entries: Vec<BlockEntry>,
}

impl BlockTable {
    /// Read and decrypt a block table from the archive
    pub fn read<R: Read + Seek>(reader: &mut R, position: u64, count: u32) -> Result<Self> {
        let raw_data = read_encrypted_records(reader, position, count, BLOCK_TABLE_SEED)?;
        Ok(Self::from_decrypted(&raw_data))
    }

    /// Parse an already decrypted table
    pub fn from_decrypted(data: &[u8]) -> Self {
        Self {
            entries: records(data).map(BlockEntry::from_bytes).collect(),
        }
    }

    /// Get all entries
    pub fn entries(&self) -> &[BlockEntry] {
        &self.entries
    }

    /// Look up the entry a hash entry points at
    pub fn get(&self, index: u32) -> Result<&BlockEntry> {
        self.entries
            .get(index as usize)
            .ok_or(Error::BlockIndexOutOfRange {
                index,
                len: self.entries.len(),
            })
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
