//! Info command implementation

use super::open_archive;
use crate::output;
use anyhow::Result;
use colored::*;
use serde::Serialize;
use zamara::header::{ArchiveHeader, UserDataHeader};

#[derive(Serialize)]
struct ArchiveInfo<'a> {
    archive: &'a str,
    archive_offset: u64,
    sector_size: Option<u64>,
    file_count: usize,
    header: &'a ArchiveHeader,
    user_data: Option<&'a UserDataHeader>,
}

/// Show the headers of an archive
pub fn info(archive_path: &str) -> Result<()> {
    let archive = open_archive(archive_path)?;
    let header = archive.header();

    let info = ArchiveInfo {
        archive: archive_path,
        archive_offset: archive.archive_offset(),
        sector_size: header.sector_size(),
        file_count: archive.list_files().len(),
        header,
        user_data: archive.user_data(),
    };

    if !output::text_mode() {
        output::print_output(&info)?;
        return Ok(());
    }

    output::heading("Archive");
    println!("  Path:             {}", archive_path.cyan());
    println!("  Archive offset:   {:#x}", info.archive_offset);
    println!("  Known files:      {}", info.file_count);
    println!();

    output::heading("Header");
    println!("  Header size:      {}", header.header_size);
    println!("  Archive size:     {}", header.archive_size);
    println!("  Format version:   {}", header.format_version);
    match info.sector_size {
        Some(sector_size) => println!(
            "  Block size:       {} (sector size {})",
            header.block_size, sector_size
        ),
        None => println!("  Block size:       {} (out of range)", header.block_size),
    }
    println!(
        "  Hash table:       {} entries at {:#x}",
        header.hash_table_entries, header.hash_table_offset
    );
    println!(
        "  Block table:      {} entries at {:#x}",
        header.block_table_entries, header.block_table_offset
    );
    if header.format_version >= 1 {
        println!(
            "  Extended table:   {:#x}",
            header.extended_block_table_offset
        );
    }

    if let Some(user_data) = info.user_data {
        println!();
        output::heading("User data");
        println!("  Max size:         {}", user_data.max_user_data_size);
        println!("  Archive offset:   {:#x}", user_data.archive_offset);
        println!("  Data size:        {}", user_data.user_data_size);
    }

    Ok(())
}
