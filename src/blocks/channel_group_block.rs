use super::CG_BLOCK_SIZE;
use crate::{
    Result,
    blocks::common::{BlockHeader, BlockParse, read_u16, read_u32, read_u64, validate_buffer_size},
};

/// `cg_flags` bit marking a channel group that only carries VLSD records.
pub const CG_FLAG_VLSD: u16 = 1;

#[derive(Debug, Clone)]
pub struct ChannelGroupBlock {
    pub header: BlockHeader,
    pub next_cg_addr: u64,
    pub first_ch_addr: u64,
    pub acq_name_addr: u64,
    pub acq_source_addr: u64,
    pub comment_addr: u64,
    pub record_id: u64,
    pub cycles_nr: u64,
    pub flags: u16,
    pub path_separator: u16,
    /// Data bytes per record, excluding record ID and invalidation bytes.
    pub samples_byte_nr: u32,
    pub invalidation_bytes_nr: u32,
}

impl BlockParse<'_> for ChannelGroupBlock {
    const ID: &'static [u8; 4] = b"##CG";

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = Self::parse_header(bytes)?;
        validate_buffer_size(bytes, CG_BLOCK_SIZE)?;

        Ok(Self {
            header,
            next_cg_addr: read_u64(bytes, 24),
            first_ch_addr: read_u64(bytes, 32),
            acq_name_addr: read_u64(bytes, 40),
            acq_source_addr: read_u64(bytes, 48),
            // 56: first sample reduction block, not used
            comment_addr: read_u64(bytes, 64),
            record_id: read_u64(bytes, 72),
            cycles_nr: read_u64(bytes, 80),
            flags: read_u16(bytes, 88),
            path_separator: read_u16(bytes, 90),
            samples_byte_nr: read_u32(bytes, 96),
            invalidation_bytes_nr: read_u32(bytes, 100),
        })
    }
}

impl ChannelGroupBlock {
    /// True when the group holds VLSD records instead of fixed-size ones.
    pub fn is_vlsd(&self) -> bool {
        self.flags & CG_FLAG_VLSD != 0
    }

    /// For a VLSD group the 64-bit byte count is split over the two u32 fields.
    pub fn vlsd_byte_count(&self) -> u64 {
        u64::from(self.samples_byte_nr) | (u64::from(self.invalidation_bytes_nr) << 32)
    }
}
