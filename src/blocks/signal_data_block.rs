use crate::{
    Result,
    blocks::common::{BLOCK_HEADER_SIZE, BlockHeader, BlockParse, validate_buffer_size},
    blocks::data_block::payload_end,
};

/// SDBLOCK: Signal Data Block (variable-length signal values).
#[derive(Debug, Clone)]
pub struct SignalDataBlock<'a> {
    pub header: BlockHeader,
    /// The concatenated sequence of VLSD values:
    /// `[u32 length][value bytes]` repeated back-to-back.
    pub data: &'a [u8],
}

impl<'a> BlockParse<'a> for SignalDataBlock<'a> {
    const ID: &'static [u8; 4] = b"##SD";

    fn from_bytes(bytes: &'a [u8]) -> Result<Self> {
        let header = Self::parse_header(bytes)?;
        let end = payload_end(&header);
        validate_buffer_size(bytes, end)?;
        Ok(SignalDataBlock {
            header,
            data: &bytes[BLOCK_HEADER_SIZE..end],
        })
    }
}
