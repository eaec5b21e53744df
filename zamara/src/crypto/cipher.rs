//! The MPQ table cipher

use super::hash::{hash_string, HashType};
use super::table::ENCRYPTION_TABLE;
use crate::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};

/// Next key in the cipher's key schedule
#[inline]
fn next_key(key: u32) -> u32 {
    (!key << 0x15).wrapping_add(0x1111_1111) | (key >> 0x0B)
}

#[inline]
fn mix_value(key: u32) -> u32 {
    ENCRYPTION_TABLE[HashType::KeyMix.table_offset() + (key & 0xFF) as usize]
}

/// Decrypt a block of words in place
pub fn decrypt_block(data: &mut [u32], mut key: u32) {
    let mut seed: u32 = 0xEEEE_EEEE;

    for value in data.iter_mut() {
        seed = seed.wrapping_add(mix_value(key));

        let plain = *value ^ key.wrapping_add(seed);
        *value = plain;

        key = next_key(key);
        seed = plain
            .wrapping_add(seed)
            .wrapping_add(seed << 5)
            .wrapping_add(3);
    }
}

/// Encrypt a block of words in place
///
/// Inverse of [`decrypt_block`]. The archive reader never needs it; it is
/// exposed for building test data.
pub fn encrypt_block(data: &mut [u32], mut key: u32) {
    let mut seed: u32 = 0xEEEE_EEEE;

    for value in data.iter_mut() {
        seed = seed.wrapping_add(mix_value(key));

        let plain = *value;
        *value = plain ^ key.wrapping_add(seed);

        key = next_key(key);
        seed = plain
            .wrapping_add(seed)
            .wrapping_add(seed << 5)
            .wrapping_add(3);
    }
}

/// Stream cipher keyed by a seed string
///
/// The hash and block tables are encrypted with keys derived from the
/// literal strings `"(hash table)"` and `"(block table)"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockCipher {
    key: u32,
}

impl BlockCipher {
    /// Create a cipher whose key is the hash of `seed`
    pub fn new(seed: &str, hash_type: HashType) -> Self {
        Self {
            key: hash_string(seed, hash_type),
        }
    }

    /// Create a cipher from an already derived key
    pub fn from_key(key: u32) -> Self {
        Self { key }
    }

    /// The initial key
    pub fn key(&self) -> u32 {
        self.key
    }

    /// Decrypt `buffer` in place as a sequence of little-endian words
    ///
    /// Every call starts from the initial key, so decrypting the same
    /// ciphertext twice gives the same plaintext.
    pub fn decrypt(&self, buffer: &mut [u8]) -> Result<()> {
        if buffer.len() % 4 != 0 {
            return Err(Error::UnalignedBuffer(buffer.len()));
        }

        let mut words = vec![0u32; buffer.len() / 4];
        LittleEndian::read_u32_into(buffer, &mut words);
        decrypt_block(&mut words, self.key);
        LittleEndian::write_u32_into(&words, buffer);

        Ok(())
    }

    /// Encrypt `buffer` in place as a sequence of little-endian words
    pub fn encrypt(&self, buffer: &mut [u8]) -> Result<()> {
        if buffer.len() % 4 != 0 {
            return Err(Error::UnalignedBuffer(buffer.len()));
        }

        let mut words = vec![0u32; buffer.len() / 4];
        LittleEndian::read_u32_into(buffer, &mut words);
        encrypt_block(&mut words, self.key);
        LittleEndian::write_u32_into(&words, buffer);

        Ok(())
    }
}
