use super::CN_BLOCK_SIZE;
use crate::{
    Result,
    blocks::common::{
        BlockHeader, BlockParse, DataType, read_u8, read_u32, read_u64, validate_buffer_size,
    },
};

/// `cn_type` of a VLSD channel.
pub const CN_TYPE_VLSD: u8 = 1;
/// `cn_type` of a master channel.
pub const CN_TYPE_MASTER: u8 = 2;
/// `cn_type` of a virtual master channel.
pub const CN_TYPE_VIRTUAL_MASTER: u8 = 3;

/// `cn_flags` bit 0: every sample of this channel is invalid.
pub const CN_FLAG_ALL_INVALID: u32 = 1 << 0;
/// `cn_flags` bit 1: an invalidation bit is used.
pub const CN_FLAG_INVAL_BIT: u32 = 1 << 1;

/// Channel Block (##CN). Only the links and the record geometry are kept;
/// source info, attachments and value ranges are skipped.
#[derive(Debug, Clone)]
pub struct ChannelBlock {
    pub header: BlockHeader,
    pub next_ch_addr: u64,
    pub name_addr: u64,
    pub conversion_addr: u64,
    /// Signal data of a VLSD channel: SD, DL, DZ or HL, or a CG in
    /// files that store VLSD records in the data group itself.
    pub data_addr: u64,
    pub unit_addr: u64,
    pub comment_addr: u64,
    pub channel_type: u8,
    pub sync_type: u8,
    pub data_type: DataType,
    pub bit_offset: u8,
    pub byte_offset: u32,
    pub bit_count: u32,
    pub flags: u32,
    pub pos_invalidation_bit: u32,
}

impl BlockParse<'_> for ChannelBlock {
    const ID: &'static [u8; 4] = b"##CN";

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = Self::parse_header(bytes)?;
        validate_buffer_size(bytes, CN_BLOCK_SIZE)?;

        // links 0..8 start at 24, the format section at 88
        let link = |index: usize| read_u64(bytes, 24 + index * 8);
        Ok(Self {
            header,
            next_ch_addr: link(0),
            name_addr: link(2),
            conversion_addr: link(4),
            data_addr: link(5),
            unit_addr: link(6),
            comment_addr: link(7),
            channel_type: read_u8(bytes, 88),
            sync_type: read_u8(bytes, 89),
            data_type: DataType::from_u8(read_u8(bytes, 90)),
            bit_offset: read_u8(bytes, 91),
            byte_offset: read_u32(bytes, 92),
            bit_count: read_u32(bytes, 96),
            flags: read_u32(bytes, 100),
            pos_invalidation_bit: read_u32(bytes, 104),
        })
    }
}

impl ChannelBlock {
    #[inline]
    pub fn is_vlsd(&self) -> bool {
        self.channel_type == CN_TYPE_VLSD
    }

    #[inline]
    pub fn is_master(&self) -> bool {
        matches!(self.channel_type, CN_TYPE_MASTER | CN_TYPE_VIRTUAL_MASTER)
    }
}
