//! `##DZ` blocks. Parsing only exposes the header and the compressed
//! bytes; [`crate::parsing::inflate`] turns them back into the original
//! payload.

use crate::{
    Error, Result,
    blocks::common::{
        BlockHeader, BlockKind, BlockParse, read_u8, read_u32, read_u64, validate_buffer_size,
    },
};

/// `dz_zip_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DzCompressionType {
    /// zlib stream of the original bytes.
    Deflate,
    /// zlib stream of the bytes after column-wise reordering by
    /// `zip_parameter` columns.
    TranspositionDeflate,
}

impl TryFrom<u8> for DzCompressionType {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::Deflate),
            1 => Ok(Self::TranspositionDeflate),
            other => Err(Error::Decompression(format!(
                "unknown DZ compression type {other}"
            ))),
        }
    }
}

/// Bytes before the compressed stream.
pub const DZ_HEADER_SIZE: usize = 48;

/// Compressed stand-in for a DT, DV, SD or similar block. The payload is
/// borrowed from the block buffer.
#[derive(Debug, Clone)]
pub struct DzBlock<'a> {
    pub header: BlockHeader,
    /// Tag of the replaced block, without the `##`.
    pub original_block_type: [u8; 2],
    pub zip_type: DzCompressionType,
    /// Column count (record stride) for transposition, unused otherwise.
    pub zip_parameter: u32,
    /// Length the payload must have once inflated.
    pub original_data_length: u64,
    pub compressed_data_length: u64,
    pub data: &'a [u8],
}

impl<'a> BlockParse<'a> for DzBlock<'a> {
    const ID: &'static [u8; 4] = b"##DZ";

    fn from_bytes(bytes: &'a [u8]) -> Result<Self> {
        let header = Self::parse_header(bytes)?;
        validate_buffer_size(bytes, DZ_HEADER_SIZE)?;

        let compressed_data_length = read_u64(bytes, 40);
        let end = usize::try_from(compressed_data_length)
            .ok()
            .and_then(|len| len.checked_add(DZ_HEADER_SIZE))
            .unwrap_or(usize::MAX);
        validate_buffer_size(bytes, end)?;

        Ok(Self {
            header,
            original_block_type: [bytes[24], bytes[25]],
            zip_type: DzCompressionType::try_from(read_u8(bytes, 26))?,
            zip_parameter: read_u32(bytes, 28),
            original_data_length: read_u64(bytes, 32),
            compressed_data_length,
            data: &bytes[DZ_HEADER_SIZE..end],
        })
    }
}

impl DzBlock<'_> {
    /// The block kind the inflated payload stands for.
    pub fn claimed_kind(&self) -> BlockKind {
        let [a, b] = self.original_block_type;
        BlockKind::from_tag([b'#', b'#', a, b])
    }
}
