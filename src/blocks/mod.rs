//! Parsers for the MDF4 blocks the reader touches. Each parser takes the
//! raw block bytes, header included, and never follows links itself.

// Fixed sizes. TX, MD, DT, SD, DL, DZ and HL are sized by their header.
pub(crate) const ID_BLOCK_SIZE: usize = 64;
pub(crate) const HD_BLOCK_SIZE: usize = 104;
pub(crate) const DG_BLOCK_SIZE: usize = 64;
pub(crate) const CG_BLOCK_SIZE: usize = 104;
pub(crate) const CN_BLOCK_SIZE: usize = 160;

mod channel_block;
mod channel_group_block;
mod common;
mod conversion;
mod data_block;
mod data_group_block;
mod data_list_block;
mod dz_block;
mod header_block;
mod header_list_block;
mod identification_block;
mod signal_data_block;
mod text_block;

pub use common::{BLOCK_HEADER_SIZE, BlockHeader, BlockKind, BlockParse, DataType};
pub(crate) use common::u64_to_usize;

pub use channel_block::{
    CN_FLAG_ALL_INVALID, CN_FLAG_INVAL_BIT, CN_TYPE_MASTER, CN_TYPE_VIRTUAL_MASTER, CN_TYPE_VLSD,
    ChannelBlock,
};
pub use channel_group_block::{CG_FLAG_VLSD, ChannelGroupBlock};
pub use data_block::DataBlock;
pub use data_group_block::DataGroupBlock;
pub use data_list_block::DataListBlock;
pub use dz_block::{DZ_HEADER_SIZE, DzBlock, DzCompressionType};
pub use header_block::HeaderBlock;
pub use header_list_block::HeaderListBlock;
pub use identification_block::{IdentificationBlock, MIN_VERSION};
pub use signal_data_block::SignalDataBlock;
pub use text_block::TextBlock;

pub use conversion::{Conversion, ConversionBlock, ConversionType, ValueToText};
#[cfg(test)]
pub(crate) use conversion::cc_bytes;
