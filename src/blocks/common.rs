//! Pieces shared by every block parser: the 24-byte [`BlockHeader`], the
//! [`BlockKind`] routing tags, the [`BlockParse`] trait, [`DataType`] and
//! little-endian field readers.

use crate::{Error, Result};

/// Size of the common block header.
pub const BLOCK_HEADER_SIZE: usize = 24;

// Field readers. All of them index directly, so callers check the buffer
// length with `validate_buffer_size` first.

#[inline]
pub fn read_u64(bytes: &[u8], offset: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(buf)
}

#[inline]
pub fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(buf)
}

#[inline]
pub fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

#[inline]
pub fn read_f64(bytes: &[u8], offset: usize) -> f64 {
    f64::from_bits(read_u64(bytes, offset))
}

#[inline]
pub fn read_u8(bytes: &[u8], offset: usize) -> u8 {
    bytes[offset]
}

/// Fails with [`Error::TooShortBuffer`] unless `bytes` holds `expected` bytes.
#[inline]
pub fn validate_buffer_size(bytes: &[u8], expected: usize) -> Result<()> {
    if bytes.len() < expected {
        return Err(Error::TooShortBuffer {
            actual: bytes.len(),
            expected,
            file: file!(),
            line: line!(),
        });
    }
    Ok(())
}

/// File quantity as a `usize`, or [`Error::InvalidLayout`] naming `context`
/// when it does not fit on this platform.
#[inline]
pub fn u64_to_usize(value: u64, context: &str) -> Result<usize> {
    usize::try_from(value).map_err(|_| {
        Error::InvalidLayout(format!(
            "{context} {value} does not fit in memory on this platform"
        ))
    })
}

/// Tags the extraction engine distinguishes.
///
/// Everything else the engine may meet in a data block graph is carried as
/// [`BlockKind::Other`] with the raw tag so errors can name it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// `##DT` - fixed-stride record data
    Data,
    /// `##DV` - fixed-stride record data without invalidation bytes
    DataValues,
    /// `##DL` - ordered list of data blocks
    DataList,
    /// `##DZ` - zlib compressed data block
    Compressed,
    /// `##HL` - header of a list of compressed data blocks
    HeaderList,
    /// `##SD` - length-prefixed variable length signal data
    SignalData,
    Other([u8; 4]),
}

impl BlockKind {
    pub fn from_tag(tag: [u8; 4]) -> Self {
        match &tag {
            b"##DT" => BlockKind::Data,
            b"##DV" => BlockKind::DataValues,
            b"##DL" => BlockKind::DataList,
            b"##DZ" => BlockKind::Compressed,
            b"##HL" => BlockKind::HeaderList,
            b"##SD" => BlockKind::SignalData,
            _ => BlockKind::Other(tag),
        }
    }

    /// The 4-byte tag for this kind.
    pub fn tag(&self) -> [u8; 4] {
        match self {
            BlockKind::Data => *b"##DT",
            BlockKind::DataValues => *b"##DV",
            BlockKind::DataList => *b"##DL",
            BlockKind::Compressed => *b"##DZ",
            BlockKind::HeaderList => *b"##HL",
            BlockKind::SignalData => *b"##SD",
            BlockKind::Other(tag) => *tag,
        }
    }

    /// True for the two fixed-stride record block kinds.
    #[inline]
    pub fn is_record_data(&self) -> bool {
        matches!(self, BlockKind::Data | BlockKind::DataValues)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub id: [u8; 4],
    pub reserved: u32,
    /// Whole block, header included.
    pub length: u64,
    pub link_count: u64,
}

impl BlockHeader {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        validate_buffer_size(bytes, BLOCK_HEADER_SIZE)?;

        Ok(Self {
            id: [bytes[0], bytes[1], bytes[2], bytes[3]],
            reserved: read_u32(bytes, 4),
            length: read_u64(bytes, 8),
            link_count: read_u64(bytes, 16),
        })
    }

    /// Classify the block by its tag.
    #[inline]
    pub fn kind(&self) -> BlockKind {
        BlockKind::from_tag(self.id)
    }

    /// The tag as text, for messages.
    pub fn id_str(&self) -> String {
        String::from_utf8_lossy(&self.id).into_owned()
    }

    /// Number of payload bytes following the header.
    #[inline]
    pub fn data_length(&self) -> u64 {
        self.length.saturating_sub(BLOCK_HEADER_SIZE as u64)
    }
}

/// Parser of one block type from a buffer starting at its header.
pub trait BlockParse<'a>: Sized {
    const ID: &'static [u8; 4];

    fn parse_header(bytes: &[u8]) -> Result<BlockHeader> {
        let header = BlockHeader::from_bytes(bytes)?;
        if &header.id != Self::ID {
            return Err(Error::BlockIDError {
                actual: header.id_str(),
                expected: String::from_utf8_lossy(Self::ID).into_owned(),
            });
        }
        Ok(header)
    }

    fn from_bytes(bytes: &'a [u8]) -> Result<Self>;
}

/// `cn_data_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataType {
    UnsignedIntegerLE,
    UnsignedIntegerBE,
    SignedIntegerLE,
    SignedIntegerBE,
    FloatLE,
    FloatBE,
    StringLatin1,
    StringUtf8,
    StringUtf16LE,
    StringUtf16BE,
    ByteArray,
    MimeSample,
    MimeStream,
    CanOpenDate,
    CanOpenTime,
    ComplexLE,
    ComplexBE,
    Unknown(u8),
}

/// Known data types with their display names, indexed by code.
const DATA_TYPES: [(DataType, &str); 17] = [
    (DataType::UnsignedIntegerLE, "uint LE"),
    (DataType::UnsignedIntegerBE, "uint BE"),
    (DataType::SignedIntegerLE, "int LE"),
    (DataType::SignedIntegerBE, "int BE"),
    (DataType::FloatLE, "float LE"),
    (DataType::FloatBE, "float BE"),
    (DataType::StringLatin1, "Latin-1 string"),
    (DataType::StringUtf8, "UTF-8 string"),
    (DataType::StringUtf16LE, "UTF-16 LE string"),
    (DataType::StringUtf16BE, "UTF-16 BE string"),
    (DataType::ByteArray, "byte array"),
    (DataType::MimeSample, "MIME sample"),
    (DataType::MimeStream, "MIME stream"),
    (DataType::CanOpenDate, "CANopen date"),
    (DataType::CanOpenTime, "CANopen time"),
    (DataType::ComplexLE, "complex LE"),
    (DataType::ComplexBE, "complex BE"),
];

impl DataType {
    pub fn from_u8(code: u8) -> Self {
        DATA_TYPES
            .get(usize::from(code))
            .map_or(DataType::Unknown(code), |&(data_type, _)| data_type)
    }

    pub fn to_u8(&self) -> u8 {
        match self {
            DataType::Unknown(code) => *code,
            known => DATA_TYPES
                .iter()
                .position(|(data_type, _)| data_type == known)
                .map_or(u8::MAX, |code| code as u8),
        }
    }

    /// Numeric payload stored most significant byte first.
    pub fn is_big_endian(&self) -> bool {
        matches!(
            self,
            DataType::UnsignedIntegerBE
                | DataType::SignedIntegerBE
                | DataType::FloatBE
                | DataType::ComplexBE
        )
    }
}

impl core::fmt::Display for DataType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match DATA_TYPES.get(usize::from(self.to_u8())) {
            Some((_, name)) if !matches!(self, DataType::Unknown(_)) => f.write_str(name),
            _ => write!(f, "data type {}", self.to_u8()),
        }
    }
}
