//! File name hashing

use super::table::ENCRYPTION_TABLE;

/// Hash types used in MPQ
///
/// The discriminant is the offset of the encryption table block the hash
/// reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum HashType {
    /// Hash used to get the home slot in the hash table
    TableOffset = 0x000,
    /// First half of the file name fingerprint
    NameA = 0x100,
    /// Second half of the file name fingerprint
    NameB = 0x200,
    /// Hash used to derive cipher keys
    FileKey = 0x300,
    /// Block used by the cipher to mix the key
    KeyMix = 0x400,
}

impl HashType {
    /// Offset of this hash type's block in the encryption table
    pub const fn table_offset(self) -> usize {
        self as usize
    }
}

/// Calculates the MPQ hash of a string
///
/// The input is upper-cased (ASCII only) before hashing, so lookups are case
/// insensitive.
pub fn hash_string(input: &str, hash_type: HashType) -> u32 {
    let mut seed1: u32 = 0x7FED_7FED;
    let mut seed2: u32 = 0xEEEE_EEEE;
    let offset = hash_type.table_offset();

    for ch in input.bytes().map(|b| b.to_ascii_uppercase()) {
        seed1 = ENCRYPTION_TABLE[offset + ch as usize] ^ seed1.wrapping_add(seed2);
        seed2 = (ch as u32)
            .wrapping_add(seed1)
            .wrapping_add(seed2)
            .wrapping_add(seed2 << 5)
            .wrapping_add(3);
    }

    seed1
}
