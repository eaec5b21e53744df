//! MPQ archive handling

use crate::{
    compression::CompressionType,
    header::{self, ArchiveHeader, UserDataHeader},
    special_files::{self, LISTFILE, OPTIONAL_SPECIAL_FILES},
    stream::{FileStream, ReadStatus, SharedSource},
    tables::{BlockEntry, BlockTable, HashEntry, HashTable},
    Error, Result,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Options for opening MPQ archives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    load_listfile: bool,
    require_listfile: bool,
}

impl OpenOptions {
    /// Create new default options
    pub fn new() -> Self {
        Self {
            load_listfile: true,
            require_listfile: true,
        }
    }

    /// Populate the file directory from `(listfile)` while opening
    pub fn load_listfile(mut self, load: bool) -> Self {
        self.load_listfile = load;
        self
    }

    /// Fail to open archives without a readable `(listfile)`
    ///
    /// When disabled a missing listfile is only logged and the directory
    /// starts out with the special files alone.
    pub fn require_listfile(mut self, require: bool) -> Self {
        self.require_listfile = require;
        self
    }

    /// Open an archive from a file on disk
    pub fn open<P: AsRef<Path>>(self, path: P) -> Result<Archive<BufReader<File>>> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut archive = self.open_source(BufReader::new(file))?;
        archive.path = Some(path.to_path_buf());
        Ok(archive)
    }

    /// Open an archive from any seekable byte source
    pub fn open_source<R: Read + Seek>(self, mut source: R) -> Result<Archive<R>> {
        let (user_data, header) = header::read_headers(&mut source)?;
        let archive_offset = user_data
            .as_ref()
            .map_or(0, |user_data| u64::from(user_data.archive_offset));

        let hash_table = HashTable::read(
            &mut source,
            archive_offset + u64::from(header.hash_table_offset),
            header.hash_table_entries,
        )?;
        let block_table = BlockTable::read(
            &mut source,
            archive_offset + u64::from(header.block_table_offset),
            header.block_table_entries,
        )?;

        log::debug!(
            "Loaded {} hash entries and {} block entries (archive offset {})",
            hash_table.len(),
            block_table.len(),
            archive_offset
        );

        let mut archive = Archive {
            source: Arc::new(Mutex::new(source)),
            path: None,
            user_data,
            header,
            archive_offset,
            hash_table,
            block_table,
            files: HashMap::new(),
            active: None,
        };

        if self.load_listfile {
            archive.load_directory(self.require_listfile)?;
        }

        Ok(archive)
    }
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// A resolved file: its name and the table entries describing it
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FileHandle {
    name: String,
    hash_entry: HashEntry,
    block_entry: BlockEntry,
    compression: CompressionType,
}

impl FileHandle {
    /// The name the file was resolved with
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The matching hash table entry
    pub fn hash_entry(&self) -> &HashEntry {
        &self.hash_entry
    }

    /// The block table entry the hash entry points at
    pub fn block_entry(&self) -> &BlockEntry {
        &self.block_entry
    }

    /// Storage method read from the file's type byte
    pub fn compression(&self) -> CompressionType {
        self.compression
    }

    /// Uncompressed size in bytes
    pub fn file_size(&self) -> u64 {
        u64::from(self.block_entry.file_size)
    }

    /// Stored size in bytes
    pub fn compressed_size(&self) -> u64 {
        u64::from(self.block_entry.compressed_size)
    }

    /// Raw block flags
    pub fn flags(&self) -> u32 {
        self.block_entry.flags
    }

    /// Windows LANGID of the file
    pub fn language(&self) -> u16 {
        self.hash_entry.language
    }

    /// Platform code of the file
    pub fn platform(&self) -> u16 {
        self.hash_entry.platform
    }
}

/// An MPQ archive
///
/// Files are read through independent [`FileStream`]s. The archive also
/// keeps one active stream for the [`select`](Archive::select) /
/// [`read`](Archive::read) pair.
pub struct Archive<R: Read + Seek> {
    source: SharedSource<R>,
    path: Option<PathBuf>,
    user_data: Option<UserDataHeader>,
    header: ArchiveHeader,
    archive_offset: u64,
    hash_table: HashTable,
    block_table: BlockTable,
    files: HashMap<String, FileHandle>,
    active: Option<FileStream<R>>,
}

impl Archive<BufReader<File>> {
    /// Open an existing MPQ archive from disk with default options
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        OpenOptions::new().open(path)
    }
}

impl<R: Read + Seek> Archive<R> {
    /// Open an archive from a seekable source with default options
    pub fn open(source: R) -> Result<Self> {
        OpenOptions::new().open_source(source)
    }

    /// Open an archive from a seekable source
    pub fn open_with(source: R, options: OpenOptions) -> Result<Self> {
        options.open_source(source)
    }

    /// Resolve the special files and everything named in `(listfile)`
    fn load_directory(&mut self, require_listfile: bool) -> Result<()> {
        for name in OPTIONAL_SPECIAL_FILES {
            if let Err(e) = self.file(name) {
                log::trace!("Special file {} not resolved: {}", name, e);
            }
        }

        let listing = match self.read_file(LISTFILE) {
            Ok(listing) => listing,
            Err(e) if !require_listfile => {
                log::warn!("Archive has no usable (listfile): {}", e);
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        for name in special_files::parse_listfile(&listing) {
            if let Err(e) = self.file(&name) {
                log::debug!("Skipping listed file {}: {}", name, e);
            }
        }

        log::debug!("Directory holds {} files", self.files.len());
        Ok(())
    }

    /// Find the hash entry for a file name
    pub fn resolve(&self, name: &str) -> Result<&HashEntry> {
        self.hash_table
            .find(name)
            .ok_or_else(|| Error::FileNotFound(name.to_string()))
    }

    /// Resolve a file, caching the result for the archive's lifetime
    pub fn file(&mut self, name: &str) -> Result<FileHandle> {
        if let Some(handle) = self.files.get(name) {
            return Ok(handle.clone());
        }

        let hash_entry = *self.resolve(name)?;
        let block_entry = *self.block_table.get(hash_entry.block_index)?;
        let compression = if block_entry.file_size == 0 {
            CompressionType::None
        } else {
            self.read_compression_byte(&block_entry)?
        };

        log::trace!(
            "Resolved {} to block {} ({})",
            name,
            hash_entry.block_index,
            compression.name()
        );

        let handle = FileHandle {
            name: name.to_string(),
            hash_entry,
            block_entry,
            compression,
        };
        self.files.insert(name.to_string(), handle.clone());
        Ok(handle)
    }

    fn read_compression_byte(&self, block_entry: &BlockEntry) -> Result<CompressionType> {
        let mut source = self.source.lock();
        source.seek(SeekFrom::Start(self.file_position(block_entry)))?;
        let mut type_byte = [0u8; 1];
        source.read_exact(&mut type_byte)?;
        Ok(CompressionType::from_byte(type_byte[0]))
    }

    fn file_position(&self, block_entry: &BlockEntry) -> u64 {
        self.archive_offset + u64::from(block_entry.file_position)
    }

    /// Open an independent stream positioned at the start of a file
    pub fn open_file(&mut self, name: &str) -> Result<FileStream<R>> {
        let handle = self.file(name)?;
        let data_position =
            self.file_position(&handle.block_entry) + handle.compression.header_len();

        Ok(FileStream::new(
            handle.name,
            Arc::clone(&self.source),
            data_position,
            handle.compression,
            u64::from(handle.block_entry.file_size),
        ))
    }

    /// Make a file the active read target, replacing any previous one
    pub fn select(&mut self, name: &str) -> Result<FileHandle> {
        let stream = self.open_file(name)?;
        self.active = Some(stream);
        self.file(name)
    }

    /// Name of the active file
    pub fn selected(&self) -> Option<&str> {
        self.active.as_ref().map(FileStream::name)
    }

    /// Read from the active file
    pub fn read(&mut self, buf: &mut [u8]) -> Result<(usize, ReadStatus)> {
        self.active
            .as_mut()
            .ok_or(Error::NoFileSelected)?
            .read_chunk(buf)
    }

    /// Read a whole file through a fresh stream
    pub fn read_file(&mut self, name: &str) -> Result<Vec<u8>> {
        self.open_file(name)?.read_to_vec()
    }

    /// Names of all resolved files, sorted
    pub fn list_files(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.files.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// All resolved files, sorted by name
    pub fn file_handles(&self) -> Vec<&FileHandle> {
        let mut handles: Vec<&FileHandle> = self.files.values().collect();
        handles.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        handles
    }

    /// Get the archive header
    pub fn header(&self) -> &ArchiveHeader {
        &self.header
    }

    /// Get the user data header if present
    pub fn user_data(&self) -> Option<&UserDataHeader> {
        self.user_data.as_ref()
    }

    /// Whether the archive starts with a user data block
    pub fn has_user_data(&self) -> bool {
        self.user_data.is_some()
    }

    /// Offset of the archive header; table and file positions are relative to it
    pub fn archive_offset(&self) -> u64 {
        self.archive_offset
    }

    /// Path the archive was opened from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Decrypted hash table entries
    pub fn hash_entries(&self) -> &[HashEntry] {
        self.hash_table.entries()
    }

    /// Decrypted block table entries
    pub fn block_entries(&self) -> &[BlockEntry] {
        self.block_table.entries()
    }
}

impl<R: Read + Seek> fmt::Debug for Archive<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Archive")
            .field("path", &self.path)
            .field("archive_offset", &self.archive_offset)
            .field("header", &self.header)
            .field("files", &self.files.len())
            .field("active", &self.active)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_default_options() {
        let options = OpenOptions::default();
        assert!(options.load_listfile);
        assert!(options.require_listfile);

        let relaxed = options.require_listfile(false).load_listfile(false);
        assert!(!relaxed.load_listfile);
        assert!(!relaxed.require_listfile);
    }

    #[test]
    fn test_open_rejects_other_formats() {
        let result = Archive::open(Cursor::new(b"RIFF\0\0\0\0WAVE".to_vec()));
        assert!(matches!(result, Err(Error::NotAContainer)));
    }

    #[test]
    fn test_open_missing_path() {
        let result = Archive::open_path("/nonexistent/replay.SC2Replay");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
