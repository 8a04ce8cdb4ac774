use super::DG_BLOCK_SIZE;
use crate::{
    Error, Result,
    blocks::common::{BlockHeader, BlockParse, read_u8, read_u64, validate_buffer_size},
};

/// Data Group Block (##DG): one data section shared by its channel groups.
#[derive(Debug, Clone)]
pub struct DataGroupBlock {
    pub header: BlockHeader,
    pub next_dg_addr: u64,
    pub first_cg_addr: u64,
    /// DT, DV, DZ, DL or HL holding the records, 0 when there are none.
    pub data_block_addr: u64,
    pub comment_addr: u64,
    /// Bytes of record ID before each record.
    pub record_id_size: u8,
}

impl BlockParse<'_> for DataGroupBlock {
    const ID: &'static [u8; 4] = b"##DG";

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = Self::parse_header(bytes)?;
        validate_buffer_size(bytes, DG_BLOCK_SIZE)?;

        let record_id_size = read_u8(bytes, 56);
        if !matches!(record_id_size, 0 | 1 | 2 | 4 | 8) {
            return Err(Error::InvalidLayout(format!(
                "record ID size {record_id_size} is not one of 0, 1, 2, 4 or 8"
            )));
        }

        Ok(Self {
            header,
            next_dg_addr: read_u64(bytes, 24),
            first_cg_addr: read_u64(bytes, 32),
            data_block_addr: read_u64(bytes, 40),
            comment_addr: read_u64(bytes, 48),
            record_id_size,
        })
    }
}
