//! Cryptographic operations for MPQ archives
//! Includes the shared encryption table, file name hashing and the table cipher

mod cipher;
mod hash;
mod table;

// Re-export public API
pub use cipher::{decrypt_block, encrypt_block, BlockCipher};
pub use hash::{hash_string, HashType};
pub use table::{ENCRYPTION_TABLE, ENCRYPTION_TABLE_SIZE};

/// Seed string of the hash table cipher
pub const HASH_TABLE_SEED: &str = "(hash table)";

/// Seed string of the block table cipher
pub const BLOCK_TABLE_SEED: &str = "(block table)";
