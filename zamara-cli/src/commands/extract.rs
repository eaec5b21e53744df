//! Extract command implementation

use crate::output;
use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use zamara::Archive;

#[derive(Serialize)]
struct ExtractResult {
    archive: String,
    output_dir: String,
    total_files: usize,
    extracted: usize,
    failed: usize,
    files: Vec<FileExtractResult>,
}

#[derive(Serialize)]
struct FileExtractResult {
    filename: String,
    output_path: String,
    size: u64,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Extract files from an archive
///
/// Without `specific_file` every file the archive knows by name is written.
pub fn extract(archive_path: &str, output_dir: &str, specific_file: Option<&str>) -> Result<()> {
    let mut archive = super::open_archive(archive_path)?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir))?;

    let names: Vec<String> = match specific_file {
        Some(name) => vec![name.to_string()],
        None => archive.list_files().into_iter().map(String::from).collect(),
    };

    let mut files = Vec::with_capacity(names.len());
    for name in &names {
        let output_path = build_output_path(output_dir, name);
        let result = extract_file(&mut archive, name, &output_path);

        if output::text_mode() {
            match &result {
                Ok(size) => println!(
                    "{} {} ({})",
                    "Extracted".green(),
                    name,
                    super::format_size(*size)
                ),
                Err(e) => eprintln!("{} {}: {:#}", "Failed".red(), name, e),
            }
        }

        let (size, status, error) = match result {
            Ok(size) => (size, "success", None),
            Err(e) => (0, "failed", Some(format!("{:#}", e))),
        };
        files.push(FileExtractResult {
            filename: name.clone(),
            output_path: output_path.display().to_string(),
            size,
            status,
            error,
        });
    }

    let failed = files.iter().filter(|f| f.status == "failed").count();
    let summary = ExtractResult {
        archive: archive_path.to_string(),
        output_dir: output_dir.to_string(),
        total_files: files.len(),
        extracted: files.len() - failed,
        failed,
        files,
    };

    if output::text_mode() {
        println!(
            "{} {} of {} files to {}",
            "Done:".bold(),
            summary.extracted,
            summary.total_files,
            output_dir.cyan()
        );
    } else {
        output::print_output(&summary)?;
    }

    // A requested file that cannot be extracted is a command failure
    if specific_file.is_some() && failed > 0 {
        anyhow::bail!("Failed to extract {}", names[0]);
    }

    Ok(())
}

fn extract_file(
    archive: &mut Archive<BufReader<File>>,
    name: &str,
    output_path: &Path,
) -> Result<u64> {
    let data = archive
        .read_file(name)
        .with_context(|| format!("Failed to read {}", name))?;

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output_path, &data)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    Ok(data.len() as u64)
}

/// Map an archive file name to a path under `output_dir`
///
/// Parentheses become underscores so `(listfile)` is written as `_listfile_`.
fn build_output_path(output_dir: &str, archive_filename: &str) -> PathBuf {
    let mut path = PathBuf::from(output_dir);
    for component in archive_filename
        .replace(['(', ')'], "_")
        .split(['\\', '/'])
        .filter(|c| !c.is_empty() && *c != "." && *c != "..")
    {
        path.push(component);
    }
    path
}
