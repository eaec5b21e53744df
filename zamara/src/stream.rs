//! Independent read streams over a shared archive source

use crate::compression::CompressionType;
use crate::{Error, Result};
use bzip2::read::BzDecoder;
use parking_lot::Mutex;
use std::fmt;
use std::io::{self, ErrorKind, Read, Seek, SeekFrom};
use std::sync::Arc;

/// Byte source shared by an archive and all of its streams
pub type SharedSource<R> = Arc<Mutex<R>>;

/// Upper bound on buffer space reserved from a size field before any data arrives
const PREALLOCATE_LIMIT: u64 = 1 << 20;

const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Read exactly `len` bytes
///
/// `len` usually comes from the archive itself, so the buffer grows with the
/// data actually read instead of being allocated up front.
pub(crate) fn read_exact_vec<R: Read>(reader: &mut R, len: u64) -> io::Result<Vec<u8>> {
    let mut data = Vec::with_capacity(len.min(PREALLOCATE_LIMIT) as usize);
    reader.by_ref().take(len).read_to_end(&mut data)?;

    if (data.len() as u64) < len {
        return Err(io::Error::new(
            ErrorKind::UnexpectedEof,
            format!("expected {} bytes, source ended after {}", len, data.len()),
        ));
    }
    Ok(data)
}

/// Outcome of a chunked read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// More bytes remain in the file
    More,
    /// The file has been read to its end
    EndOfFile,
}

/// A cursor over the shared source with its own position
///
/// The source is re-seeked before every read, so any number of windows can
/// be interleaved.
pub struct SourceWindow<R> {
    source: SharedSource<R>,
    position: u64,
}

impl<R> SourceWindow<R> {
    /// Create a window starting at an absolute position
    pub fn new(source: SharedSource<R>, position: u64) -> Self {
        Self { source, position }
    }

    /// Current absolute position
    pub fn position(&self) -> u64 {
        self.position
    }
}

impl<R: Read + Seek> Read for SourceWindow<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut source = self.source.lock();
        source.seek(SeekFrom::Start(self.position))?;
        let n = source.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }
}

impl<R> fmt::Debug for SourceWindow<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceWindow")
            .field("position", &self.position)
            .finish()
    }
}

enum Decoder<R: Read + Seek> {
    Raw(SourceWindow<R>),
    BZip2(BzDecoder<SourceWindow<R>>),
}

impl<R: Read + Seek> Read for Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Decoder::Raw(window) => window.read(buf),
            Decoder::BZip2(decoder) => decoder.read(buf),
        }
    }
}

/// A positioned reader for one file in an archive
///
/// Reads are clamped to the file size. Each stream owns its position and
/// consumed counter; streams never disturb each other.
pub struct FileStream<R: Read + Seek> {
    name: String,
    compression: CompressionType,
    file_size: u64,
    consumed: u64,
    decoder: Decoder<R>,
}

impl<R: Read + Seek> FileStream<R> {
    /// Create a stream whose content begins at `data_position`
    ///
    /// `data_position` is the first byte after any type byte; for
    /// [`CompressionType::BZip2`] it is the start of the compressed stream.
    pub fn new(
        name: impl Into<String>,
        source: SharedSource<R>,
        data_position: u64,
        compression: CompressionType,
        file_size: u64,
    ) -> Self {
        let window = SourceWindow::new(source, data_position);
        let decoder = match compression {
            CompressionType::BZip2 => Decoder::BZip2(BzDecoder::new(window)),
            CompressionType::None | CompressionType::Unmarked(_) => Decoder::Raw(window),
        };

        Self {
            name: name.into(),
            compression,
            file_size,
            consumed: 0,
            decoder,
        }
    }

    /// Name the stream was opened with
    pub fn name(&self) -> &str {
        &self.name
    }

    /// How the file content is stored
    pub fn compression(&self) -> CompressionType {
        self.compression
    }

    /// Uncompressed size of the file
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Bytes delivered so far
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Bytes left before the end of the file
    pub fn remaining(&self) -> u64 {
        self.file_size.saturating_sub(self.consumed)
    }

    /// Read up to `buf.len()` bytes, clamped to the bytes left in the file
    ///
    /// Returns `(0, EndOfFile)` once the file is exhausted. The chunk that
    /// reaches the end of the file is returned together with `EndOfFile`.
    pub fn read_chunk(&mut self, buf: &mut [u8]) -> Result<(usize, ReadStatus)> {
        let remaining = self.remaining();
        if remaining == 0 {
            return Ok((0, ReadStatus::EndOfFile));
        }

        let wanted = usize::try_from(remaining).map_or(buf.len(), |r| r.min(buf.len()));
        let mut filled = 0;
        while filled < wanted {
            match self.decoder.read(&mut buf[filled..wanted]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Io(e)),
            }
        }

        if filled == 0 && wanted > 0 {
            return Err(Error::Io(io::Error::new(
                ErrorKind::UnexpectedEof,
                format!(
                    "{}: source ended after {} of {} bytes",
                    self.name, self.consumed, self.file_size
                ),
            )));
        }

        self.consumed += filled as u64;
        let status = if self.consumed >= self.file_size {
            ReadStatus::EndOfFile
        } else {
            ReadStatus::More
        };

        log::trace!("{}: read {} bytes ({:?})", self.name, filled, status);
        Ok((filled, status))
    }

    /// Read everything left in the file
    pub fn read_to_vec(&mut self) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(self.remaining().min(PREALLOCATE_LIMIT) as usize);
        let mut chunk = vec![0u8; READ_CHUNK_SIZE];

        loop {
            let (n, status) = self.read_chunk(&mut chunk)?;
            data.extend_from_slice(&chunk[..n]);
            if status == ReadStatus::EndOfFile {
                return Ok(data);
            }
        }
    }
}

impl<R: Read + Seek> Read for FileStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.read_chunk(buf) {
            Ok((n, _)) => Ok(n),
            Err(Error::Io(e)) => Err(e),
            Err(e) => Err(io::Error::other(e)),
        }
    }
}

impl<R: Read + Seek> fmt::Debug for FileStream<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStream")
            .field("name", &self.name)
            .field("compression", &self.compression)
            .field("file_size", &self.file_size)
            .field("consumed", &self.consumed)
            .finish()
    }
}
