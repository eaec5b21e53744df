//! Compression type byte handling for single-unit files

/// Compression method flags
pub mod flags {
    /// No compression
    pub const NONE: u8 = 0x00;
    /// BZip2 compression
    pub const BZIP2: u8 = 0x10;
}

/// How the bytes of a file are stored
///
/// Replay files carry a leading type byte at their block position. Only
/// BZip2 is decoded; any other unknown value means the file was stored
/// without a type byte and the byte belongs to the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum CompressionType {
    /// BZip2 stream after the type byte
    BZip2,
    /// Raw content after the type byte
    None,
    /// No type byte; the content starts with this value
    Unmarked(u8),
}

impl CompressionType {
    /// Classify a type byte
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            flags::BZIP2 => CompressionType::BZip2,
            flags::NONE => CompressionType::None,
            other => CompressionType::Unmarked(other),
        }
    }

    /// Number of leading bytes that are not content
    pub fn header_len(self) -> u64 {
        match self {
            CompressionType::BZip2 | CompressionType::None => 1,
            CompressionType::Unmarked(_) => 0,
        }
    }

    /// Short name used in listings
    pub fn name(self) -> &'static str {
        match self {
            CompressionType::BZip2 => "bzip2",
            CompressionType::None => "none",
            CompressionType::Unmarked(_) => "unmarked",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_byte() {
        assert_eq!(CompressionType::from_byte(0x10), CompressionType::BZip2);
        assert_eq!(CompressionType::from_byte(0x00), CompressionType::None);
        assert_eq!(
            CompressionType::from_byte(0x02),
            CompressionType::Unmarked(0x02)
        );
    }

    #[test]
    fn test_header_len() {
        assert_eq!(CompressionType::BZip2.header_len(), 1);
        assert_eq!(CompressionType::None.header_len(), 1);
        assert_eq!(CompressionType::Unmarked(b'M').header_len(), 0);
    }
}
