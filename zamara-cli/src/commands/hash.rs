//! Hash generation

use crate::output;
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use zamara::crypto::{hash_string, HashType};

#[derive(Serialize)]
struct HashValues<'a> {
    filename: &'a str,
    table_offset: u32,
    name_a: u32,
    name_b: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_key: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_mix: Option<u32>,
}

/// Generate hash values for a file name
///
/// Without `all` only the three lookup hashes are shown.
pub fn hash(filename: &str, all: bool) -> Result<()> {
    let values = HashValues {
        filename,
        table_offset: hash_string(filename, HashType::TableOffset),
        name_a: hash_string(filename, HashType::NameA),
        name_b: hash_string(filename, HashType::NameB),
        file_key: all.then(|| hash_string(filename, HashType::FileKey)),
        key_mix: all.then(|| hash_string(filename, HashType::KeyMix)),
    };

    if !output::text_mode() {
        output::print_output(&values)?;
        return Ok(());
    }

    println!("{} {}", "Hash values:".bold(), filename);
    println!("  Table offset: {:#010x}", values.table_offset);
    println!("  Name A:       {:#010x}", values.name_a);
    println!("  Name B:       {:#010x}", values.name_b);
    if let Some(file_key) = values.file_key {
        println!("  File key:     {:#010x}", file_key);
    }
    if let Some(key_mix) = values.key_mix {
        println!("  Key mix:      {:#010x}", key_mix);
    }

    Ok(())
}
