//! Subcommand implementations

pub mod extract;
pub mod hash;
pub mod info;
pub mod list;
pub mod replay;
pub mod tables;

use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use zamara::{Archive, OpenOptions};

/// Open an archive for inspection
///
/// Plain MPQ archives often ship without a `(listfile)`, so a missing one
/// only produces a warning here.
pub fn open_archive(path: &str) -> Result<Archive<BufReader<File>>> {
    OpenOptions::new()
        .require_listfile(false)
        .open(path)
        .with_context(|| format!("Failed to open archive: {}", path))
}

/// Format file size in human-readable format
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}
