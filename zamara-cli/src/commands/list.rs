//! List command implementation

use super::{format_size, open_archive};
use crate::output;
use anyhow::Result;
use colored::*;
use serde::Serialize;

#[derive(Serialize)]
struct FileEntry {
    name: String,
    size: u64,
    compressed_size: u64,
    compression: &'static str,
    flags: u32,
}

#[derive(Serialize)]
struct ListOutput {
    archive: String,
    total_files: usize,
    files: Vec<FileEntry>,
}

/// List the known files of an archive
pub fn list(archive_path: &str) -> Result<()> {
    let archive = open_archive(archive_path)?;

    let files: Vec<FileEntry> = archive
        .file_handles()
        .into_iter()
        .map(|handle| FileEntry {
            name: handle.name().to_string(),
            size: handle.file_size(),
            compressed_size: handle.compressed_size(),
            compression: handle.compression().name(),
            flags: handle.flags(),
        })
        .collect();

    output::verbose_println(1, &format!("{} files resolved", files.len()));

    if !output::text_mode() {
        output::print_output(&ListOutput {
            archive: archive_path.to_string(),
            total_files: files.len(),
            files,
        })?;
        return Ok(());
    }

    let verbose = crate::GLOBAL_OPTS
        .get()
        .is_some_and(|opts| opts.verbose > 0);

    for file in &files {
        if verbose {
            println!(
                "{:40} {:>10} {:>10} {:9} {:#010x}",
                file.name,
                format_size(file.size),
                format_size(file.compressed_size),
                file.compression,
                file.flags
            );
        } else {
            println!("{}", file.name);
        }
    }

    if verbose {
        let total: u64 = files.iter().map(|f| f.size).sum();
        println!(
            "{} {} files, {}",
            "Total:".bold(),
            files.len(),
            format_size(total)
        );
    }

    Ok(())
}
