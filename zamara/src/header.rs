//! MPQ archive and user data headers

use crate::stream::read_exact_vec;
use crate::{Error, Result};
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use std::io::{ErrorKind, Read, Seek, SeekFrom};

/// First three bytes of every MPQ stream
pub const MPQ_MAGIC: [u8; 3] = *b"MPQ";

/// Fourth signature byte of the archive header ('MPQ\x1A')
pub const ARCHIVE_MARKER: u8 = 0x1A;

/// Fourth signature byte of a leading user data block ('MPQ\x1B')
pub const USER_DATA_MARKER: u8 = 0x1B;

/// Size of the fixed user data header fields
pub const USER_DATA_HEADER_SIZE: usize = 0x10;

/// Bytes needed to decode every header field (the v2 layout minus the size field)
const HEADER_FIELDS_SIZE: usize = 0x24;

/// MPQ archive header
///
/// Field offsets are relative to the byte after `header_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ArchiveHeader {
    /// Size of the header in bytes, including the size field
    pub header_size: u32,
    /// Size of the archive in bytes
    pub archive_size: u32,
    /// MPQ format version
    pub format_version: u16,
    /// Sector size as a power of two (sector size is `512 << block_size`)
    pub block_size: u16,
    /// Offset of the hash table, relative to the archive start
    pub hash_table_offset: u32,
    /// Offset of the block table, relative to the archive start
    pub block_table_offset: u32,
    /// Number of entries in the hash table
    pub hash_table_entries: u32,
    /// Number of entries in the block table
    pub block_table_entries: u32,
    /// Offset of the extended block table (v2+)
    pub extended_block_table_offset: u64,
    /// High 16 bits of the hash table offset (v2+)
    pub hash_table_offset_high: u16,
    /// High 16 bits of the block table offset (v2+)
    pub block_table_offset_high: u16,
}

impl ArchiveHeader {
    /// Decode the header fields following the `header_size` field
    ///
    /// Headers shorter than the v2 layout (32-byte v1 headers) are
    /// zero-extended, so the v2-only fields read as zero.
    pub fn from_bytes(header_size: u32, data: &[u8]) -> Self {
        let mut fields = [0u8; HEADER_FIELDS_SIZE];
        let len = data.len().min(HEADER_FIELDS_SIZE);
        fields[..len].copy_from_slice(&data[..len]);

        Self {
            header_size,
            archive_size: LittleEndian::read_u32(&fields[0x00..]),
            format_version: LittleEndian::read_u16(&fields[0x04..]),
            block_size: LittleEndian::read_u16(&fields[0x06..]),
            hash_table_offset: LittleEndian::read_u32(&fields[0x08..]),
            block_table_offset: LittleEndian::read_u32(&fields[0x0C..]),
            hash_table_entries: LittleEndian::read_u32(&fields[0x10..]),
            block_table_entries: LittleEndian::read_u32(&fields[0x14..]),
            extended_block_table_offset: LittleEndian::read_u64(&fields[0x18..]),
            hash_table_offset_high: LittleEndian::read_u16(&fields[0x20..]),
            block_table_offset_high: LittleEndian::read_u16(&fields[0x22..]),
        }
    }

    /// Sector size in bytes, `None` when the block size shift is out of range
    pub fn sector_size(&self) -> Option<u64> {
        512u64.checked_shl(u32::from(self.block_size))
    }
}

/// Leading user data block
///
/// StarCraft II replays store their build and version information here; the
/// archive proper starts at `archive_offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UserDataHeader {
    /// Space reserved for user data
    pub max_user_data_size: u32,
    /// Offset of the archive header from the start of the stream
    pub archive_offset: u32,
    /// Size of the user data actually stored
    pub user_data_size: u32,
    /// The user data bytes that follow the fixed fields
    #[cfg_attr(feature = "serde", serde(skip))]
    pub data: Vec<u8>,
}

impl UserDataHeader {
    /// Decode the user data block, signature included
    pub fn from_bytes(block: &[u8]) -> Result<Self> {
        if block.len() < USER_DATA_HEADER_SIZE {
            return Err(Error::InvalidHeader(format!(
                "user data block is {} bytes, need at least {}",
                block.len(),
                USER_DATA_HEADER_SIZE
            )));
        }

        let max_user_data_size = LittleEndian::read_u32(&block[0x04..]);
        let archive_offset = LittleEndian::read_u32(&block[0x08..]);
        let user_data_size = LittleEndian::read_u32(&block[0x0C..]);

        let end = USER_DATA_HEADER_SIZE
            .saturating_add(user_data_size as usize)
            .min(block.len());

        Ok(Self {
            max_user_data_size,
            archive_offset,
            user_data_size,
            data: block[USER_DATA_HEADER_SIZE..end].to_vec(),
        })
    }
}

/// Read the optional user data block and the archive header
///
/// The stream is rewound to its start first. Table positions are not
/// touched; callers seek to them explicitly.
pub fn read_headers<R: Read + Seek>(
    reader: &mut R,
) -> Result<(Option<UserDataHeader>, ArchiveHeader)> {
    reader.seek(SeekFrom::Start(0))?;

    let mut signature = [0u8; 4];
    if let Err(e) = reader.read_exact(&mut signature) {
        return Err(match e.kind() {
            ErrorKind::UnexpectedEof => Error::NotAContainer,
            _ => Error::Io(e),
        });
    }
    if signature[..3] != MPQ_MAGIC {
        return Err(Error::NotAContainer);
    }

    let user_data = if signature[3] == USER_DATA_MARKER {
        let _max_user_data_size = reader.read_u32::<LittleEndian>()?;
        let user_block_size = reader.read_u32::<LittleEndian>()?;

        reader.seek(SeekFrom::Start(0))?;
        let block = read_exact_vec(reader, u64::from(user_block_size))?;
        let user_data = UserDataHeader::from_bytes(&block)?;

        // The archive header signature follows the user data block
        reader.seek(SeekFrom::Current(4))?;

        log::debug!(
            "User data block: {} bytes, archive at offset {}",
            user_block_size,
            user_data.archive_offset
        );
        Some(user_data)
    } else {
        None
    };

    let header_size = reader.read_u32::<LittleEndian>()?;
    if header_size < 4 {
        return Err(Error::InvalidHeader(format!(
            "header size {} is smaller than its own size field",
            header_size
        )));
    }

    // The field block is read as `header_size - 4` bytes, which runs four
    // bytes past the header; only the header itself has to be present.
    let mut fields = Vec::with_capacity((header_size as usize - 4).min(HEADER_FIELDS_SIZE + 4));
    reader
        .by_ref()
        .take(u64::from(header_size) - 4)
        .read_to_end(&mut fields)?;
    if fields.len() + 8 < header_size as usize {
        return Err(Error::Io(std::io::Error::new(
            ErrorKind::UnexpectedEof,
            format!(
                "archive header truncated: {} of {} bytes",
                fields.len() + 8,
                header_size
            ),
        )));
    }
    let header = ArchiveHeader::from_bytes(header_size, &fields);

    log::debug!(
        "MPQ header: version {}, {} hash entries, {} block entries",
        header.format_version,
        header.hash_table_entries,
        header.block_table_entries
    );

    Ok((user_data, header))
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;
    use std::io::{Cursor, Write};

    fn write_header(buffer: &mut Vec<u8>, header_size: u32) {
        buffer.write_all(b"MPQ\x1A").unwrap();
        buffer.write_u32::<LittleEndian>(header_size).unwrap();
        buffer.write_u32::<LittleEndian>(109012).unwrap(); // archive size
        buffer.write_u16::<LittleEndian>(1).unwrap(); // format version
        buffer.write_u16::<LittleEndian>(3).unwrap(); // block size
        buffer.write_u32::<LittleEndian>(108596).unwrap(); // hash table offset
        buffer.write_u32::<LittleEndian>(108852).unwrap(); // block table offset
        buffer.write_u32::<LittleEndian>(16).unwrap(); // hash table entries
        buffer.write_u32::<LittleEndian>(10).unwrap(); // block table entries
        if header_size >= 44 {
            buffer.write_u64::<LittleEndian>(0x1122).unwrap();
            buffer.write_u16::<LittleEndian>(7).unwrap();
            buffer.write_u16::<LittleEndian>(9).unwrap();
        }
    }

    #[test]
    fn test_read_plain_header() {
        let mut data = Vec::new();
        write_header(&mut data, 44);

        let (user_data, header) = read_headers(&mut Cursor::new(data)).unwrap();

        assert!(user_data.is_none());
        assert_eq!(header.header_size, 44);
        assert_eq!(header.archive_size, 109012);
        assert_eq!(header.format_version, 1);
        assert_eq!(header.block_size, 3);
        assert_eq!(header.hash_table_offset, 108596);
        assert_eq!(header.block_table_offset, 108852);
        assert_eq!(header.hash_table_entries, 16);
        assert_eq!(header.block_table_entries, 10);
        assert_eq!(header.extended_block_table_offset, 0x1122);
        assert_eq!(header.hash_table_offset_high, 7);
        assert_eq!(header.block_table_offset_high, 9);
        assert_eq!(header.sector_size(), Some(4096));
    }

    #[test]
    fn test_read_v1_header() {
        let mut data = Vec::new();
        write_header(&mut data, 32);

        let (_, header) = read_headers(&mut Cursor::new(data)).unwrap();

        assert_eq!(header.header_size, 32);
        assert_eq!(header.block_table_entries, 10);
        assert_eq!(header.extended_block_table_offset, 0);
        assert_eq!(header.hash_table_offset_high, 0);
        assert_eq!(header.block_table_offset_high, 0);
    }

    #[test]
    fn test_read_user_data() {
        let mut data = Vec::new();
        data.write_all(b"MPQ\x1B").unwrap();
        data.write_u32::<LittleEndian>(512).unwrap();
        data.write_u32::<LittleEndian>(64).unwrap();
        data.write_u32::<LittleEndian>(5).unwrap();
        data.write_all(b"hello").unwrap();
        data.resize(64, 0);
        write_header(&mut data, 44);

        let (user_data, header) = read_headers(&mut Cursor::new(data)).unwrap();
        let user_data = user_data.unwrap();

        assert_eq!(user_data.max_user_data_size, 512);
        assert_eq!(user_data.archive_offset, 64);
        assert_eq!(user_data.user_data_size, 5);
        assert_eq!(user_data.data, b"hello");
        assert_eq!(header.hash_table_entries, 16);
    }

    #[test]
    fn test_not_a_container() {
        let data = b"PK\x03\x04 definitely a zip file".to_vec();
        let result = read_headers(&mut Cursor::new(data));
        assert!(matches!(result, Err(Error::NotAContainer)));
    }

    #[test]
    fn test_short_stream() {
        let result = read_headers(&mut Cursor::new(b"MP".to_vec()));
        assert!(matches!(result, Err(Error::NotAContainer)));
    }

    #[test]
    fn test_truncated_header() {
        let mut data = Vec::new();
        write_header(&mut data, 44);
        data.truncate(20);

        let result = read_headers(&mut Cursor::new(data));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_tiny_header_size() {
        let mut data = b"MPQ\x1A".to_vec();
        data.write_u32::<LittleEndian>(2).unwrap();

        let result = read_headers(&mut Cursor::new(data));
        assert!(matches!(result, Err(Error::InvalidHeader(_))));
    }

    #[test]
    fn test_huge_user_data_block() {
        let mut data = b"MPQ\x1B".to_vec();
        data.write_u32::<LittleEndian>(512).unwrap();
        data.write_u32::<LittleEndian>(u32::MAX).unwrap();
        data.resize(64, 0);

        let result = read_headers(&mut Cursor::new(data));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_huge_header_size() {
        let mut data = b"MPQ\x1A".to_vec();
        data.write_u32::<LittleEndian>(u32::MAX).unwrap();
        data.resize(64, 0);

        let result = read_headers(&mut Cursor::new(data));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_sector_size_out_of_range() {
        let header = ArchiveHeader {
            block_size: 64,
            ..ArchiveHeader::default()
        };
        assert_eq!(header.sector_size(), None);

        let header = ArchiveHeader {
            block_size: 0,
            ..ArchiveHeader::default()
        };
        assert_eq!(header.sector_size(), Some(512));
    }

    #[test]
    fn test_user_data_too_small() {
        let result = UserDataHeader::from_bytes(&[0u8; 8]);
        assert!(matches!(result, Err(Error::InvalidHeader(_))));
    }
}
