//! The shared MPQ encryption table

/// Number of entries in the encryption table (five blocks of 256)
pub const ENCRYPTION_TABLE_SIZE: usize = 0x500;

/// The encryption table used for both name hashing and table decryption
///
/// Built at compile time and never mutated, so it can be shared freely.
pub static ENCRYPTION_TABLE: [u32; ENCRYPTION_TABLE_SIZE] = generate_encryption_table();

/// Generate the table from the fixed seed `0x00100001`
///
/// A single LCG state advances through all five 256-entry blocks. Each slot
/// takes its high half from one step and its low half from the next.
const fn generate_encryption_table() -> [u32; ENCRYPTION_TABLE_SIZE] {
    let mut table = [0u32; ENCRYPTION_TABLE_SIZE];
    let mut seed: u32 = 0x0010_0001;

    let mut index1 = 0;
    while index1 < 0x100 {
        let mut index2 = 0;
        while index2 < 5 {
            seed = (seed * 125 + 3) % 0x002A_AAAB;
            let high = (seed & 0xFFFF) << 0x10;

            seed = (seed * 125 + 3) % 0x002A_AAAB;
            let low = seed & 0xFFFF;

            table[index1 + index2 * 0x100] = high | low;

            index2 += 1;
        }
        index1 += 1;
    }

    table
}
