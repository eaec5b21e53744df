//! Error types for archive and serialized value decoding

use std::io;
use thiserror::Error;

/// Errors produced while reading MPQ archives and replay data
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error from the underlying byte source
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stream does not start with the MPQ signature
    #[error("Not an MPQ archive")]
    NotAContainer,

    /// The archive header is unusable
    #[error("Invalid MPQ header: {0}")]
    InvalidHeader(String),

    /// No hash table entry matches the file name
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// A hash table entry points past the end of the block table
    #[error("Block index {index} out of range (block table has {len} entries)")]
    BlockIndexOutOfRange {
        /// Block index stored in the hash entry
        index: u32,
        /// Number of block table entries
        len: usize,
    },

    /// Cipher input length is not a multiple of four
    #[error("Buffer length {0} is not a multiple of 4")]
    UnalignedBuffer(usize),

    /// `read` was called before any file was selected
    #[error("No file selected")]
    NoFileSelected,

    /// A serialized value starts with an unsupported type tag
    #[error("Unknown serialized value tag 0x{tag:02X} at offset {offset}")]
    UnknownValueTag {
        /// The tag byte
        tag: u8,
        /// Offset of the tag byte in the decoded buffer
        offset: usize,
    },

    /// A serialized value or attribute record runs past the end of its buffer
    #[error("Truncated data at offset {offset}")]
    TruncatedValue {
        /// Offset at which more bytes were needed
        offset: usize,
    },

    /// Containers nest deeper than the decoder accepts
    #[error("Serialized values nested too deeply at offset {offset}")]
    NestingTooDeep {
        /// Offset of the value past the nesting limit
        offset: usize,
    },

    /// A decoded length or element count is negative
    #[error("Invalid length: {0}")]
    InvalidLength(i64),

    /// A replay FILETIME cannot be represented as a date
    #[error("Replay timestamp {0} out of range")]
    InvalidTimestamp(i64),
}

/// Result type for archive operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the error only concerns a single lookup and the archive stays usable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::FileNotFound(_) | Error::BlockIndexOutOfRange { .. } | Error::NoFileSelected
        )
    }
}
