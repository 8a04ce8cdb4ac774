use super::HD_BLOCK_SIZE;
use crate::{
    Result,
    blocks::common::{BlockHeader, BlockParse, read_u64, validate_buffer_size},
};

/// HDBLOCK: file-level header following the identification block.
///
/// Only the links the channel directory needs are kept.
#[derive(Debug, Clone)]
pub struct HeaderBlock {
    pub header: BlockHeader,
    pub first_dg_addr: u64,
    pub file_history_addr: u64,
    pub comment_addr: u64,
    /// Start time in nanoseconds since the Unix epoch.
    pub abs_time: u64,
}

impl BlockParse<'_> for HeaderBlock {
    const ID: &'static [u8; 4] = b"##HD";

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = Self::parse_header(bytes)?;
        validate_buffer_size(bytes, HD_BLOCK_SIZE)?;

        Ok(Self {
            header,
            first_dg_addr: read_u64(bytes, 24),
            file_history_addr: read_u64(bytes, 32),
            comment_addr: read_u64(bytes, 64),
            abs_time: read_u64(bytes, 72),
        })
    }
}
