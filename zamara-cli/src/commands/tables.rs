//! Table display

use super::open_archive;
use crate::{output, TableType};
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use zamara::tables::{BlockEntry, HashEntry};

#[derive(Serialize)]
struct HashRow {
    index: usize,
    state: &'static str,
    name_a: String,
    name_b: String,
    language: u16,
    platform: u16,
    block_index: u32,
}

#[derive(Serialize)]
struct BlockRow {
    index: usize,
    file_position: u32,
    compressed_size: u32,
    file_size: u32,
    flags: String,
}

#[derive(Serialize, Default)]
struct TablesOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    hash_table: Option<Vec<HashRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    block_table: Option<Vec<BlockRow>>,
}

fn hash_state(entry: &HashEntry) -> &'static str {
    if entry.is_empty() {
        "empty"
    } else if entry.is_deleted() {
        "deleted"
    } else {
        "used"
    }
}

fn hash_rows(entries: &[HashEntry]) -> Vec<HashRow> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| HashRow {
            index,
            state: hash_state(entry),
            name_a: format!("{:#010x}", entry.file_path_hash_a),
            name_b: format!("{:#010x}", entry.file_path_hash_b),
            language: entry.language,
            platform: entry.platform,
            block_index: entry.block_index,
        })
        .collect()
}

fn block_rows(entries: &[BlockEntry]) -> Vec<BlockRow> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| BlockRow {
            index,
            file_position: entry.file_position,
            compressed_size: entry.compressed_size,
            file_size: entry.file_size,
            flags: format!("{:#010x}", entry.flags),
        })
        .collect()
}

/// Display hash and block table contents
pub fn tables(archive_path: &str, table_type: Option<TableType>) -> Result<()> {
    let archive = open_archive(archive_path)?;
    let show_hash = table_type != Some(TableType::Block);
    let show_block = table_type != Some(TableType::Hash);

    let mut tables = TablesOutput::default();
    if show_hash {
        tables.hash_table = Some(hash_rows(archive.hash_entries()));
    }
    if show_block {
        tables.block_table = Some(block_rows(archive.block_entries()));
    }

    if !output::text_mode() {
        output::print_output(&tables)?;
        return Ok(());
    }

    if let Some(rows) = &tables.hash_table {
        output::heading(&format!("Hash table ({} entries)", rows.len()));
        println!(
            "{:>5}  {:10}  {:10}  {:>6}  {:>8}  {:>11}",
            "Index", "Name A", "Name B", "Locale", "Platform", "Block"
        );
        for row in rows {
            let block = match row.state {
                "empty" => "empty".dimmed().to_string(),
                "deleted" => "deleted".yellow().to_string(),
                _ => row.block_index.to_string(),
            };
            println!(
                "{:>5}  {}  {}  {:>6}  {:>8}  {:>11}",
                row.index, row.name_a, row.name_b, row.language, row.platform, block
            );
        }
    }

    if show_hash && show_block {
        println!();
    }

    if let Some(rows) = &tables.block_table {
        output::heading(&format!("Block table ({} entries)", rows.len()));
        println!(
            "{:>5}  {:>10}  {:>10}  {:>10}  {:10}",
            "Index", "Position", "Packed", "Size", "Flags"
        );
        for row in rows {
            println!(
                "{:>5}  {:>#10x}  {:>10}  {:>10}  {}",
                row.index, row.file_position, row.compressed_size, row.file_size, row.flags
            );
        }
    }

    Ok(())
}
