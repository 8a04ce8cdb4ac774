use crate::{
    Result,
    blocks::common::{BlockHeader, BlockParse, read_u16, read_u64, read_u8, validate_buffer_size},
};

/// HLBLOCK: Header of a list of compressed data blocks.
///
/// Points at the first node of a DL chain whose children are all DZ blocks.
#[derive(Debug, Clone)]
pub struct HeaderListBlock {
    pub header: BlockHeader,
    /// Link to the first DLBLOCK.
    pub first_dl: u64,
    pub flags: u16,
    /// Compression algorithm shared by every DZ in the chain.
    pub zip_type: u8,
}

impl BlockParse<'_> for HeaderListBlock {
    const ID: &'static [u8; 4] = b"##HL";

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = Self::parse_header(bytes)?;
        validate_buffer_size(bytes, 35)?;
        Ok(Self {
            header,
            first_dl: read_u64(bytes, 24),
            flags: read_u16(bytes, 32),
            zip_type: read_u8(bytes, 34),
        })
    }
}
