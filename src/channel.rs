use std::sync::{Arc, Mutex, PoisonError};

use crate::Result;
use crate::blocks::{
    CN_FLAG_ALL_INVALID, CN_FLAG_INVAL_BIT, ChannelBlock, Conversion, DataType,
};
use crate::channel_group::ChannelGroup;
use crate::parsing::decoder::FieldLayout;
use crate::types::DecodedValue;

/// Decoded samples of one channel, shared between the cache and callers.
pub type Samples = Arc<[DecodedValue]>;

/// `cn_type` of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChannelType {
    FixedLength,
    VariableLength,
    Master,
    VirtualMaster,
    Sync,
    MaximumLength,
    VirtualData,
    Other(u8),
}

impl ChannelType {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => ChannelType::FixedLength,
            1 => ChannelType::VariableLength,
            2 => ChannelType::Master,
            3 => ChannelType::VirtualMaster,
            4 => ChannelType::Sync,
            5 => ChannelType::MaximumLength,
            6 => ChannelType::VirtualData,
            other => ChannelType::Other(other),
        }
    }
}

/// A measurement channel and its decode geometry.
///
/// Samples are decoded on first request and kept in a per-channel cache
/// until [`crate::Extractor::reread`] drops them.
#[derive(Debug)]
pub struct Channel {
    pub name: String,
    pub unit: Option<String>,
    pub comment: Option<String>,
    pub channel_type: ChannelType,
    pub sync_type: u8,
    pub data_type: DataType,
    /// Offset of the field in the record's data bytes (after the record ID).
    pub byte_offset: u32,
    pub bit_offset: u8,
    pub bit_count: u32,
    pub flags: u32,
    pub pos_invalidation_bit: u32,
    /// Block graph owned by this channel (signal data of VLSD channels).
    /// When absent the data group's block graph is read.
    pub data_address: Option<u64>,
    pub conversion: Option<Conversion>,
    /// Name of the master channel of the group, if any.
    pub master: Option<String>,
    cache: Mutex<Option<Samples>>,
}

impl Channel {
    /// A fixed-length channel without conversion.
    pub fn new(
        name: impl Into<String>,
        data_type: DataType,
        byte_offset: u32,
        bit_offset: u8,
        bit_count: u32,
    ) -> Self {
        Self {
            name: name.into(),
            unit: None,
            comment: None,
            channel_type: ChannelType::FixedLength,
            sync_type: 0,
            data_type,
            byte_offset,
            bit_offset,
            bit_count,
            flags: 0,
            pos_invalidation_bit: 0,
            data_address: None,
            conversion: None,
            master: None,
            cache: Mutex::new(None),
        }
    }

    /// Build a channel from its CN block. Names and conversion are resolved
    /// by the caller.
    pub fn from_block(block: &ChannelBlock, name: String) -> Self {
        let mut channel = Self::new(
            name,
            block.data_type,
            block.byte_offset,
            block.bit_offset,
            block.bit_count,
        );
        channel.channel_type = ChannelType::from_u8(block.channel_type);
        channel.sync_type = block.sync_type;
        channel.flags = block.flags;
        channel.pos_invalidation_bit = block.pos_invalidation_bit;
        if block.is_vlsd() && block.data_addr != 0 {
            channel.data_address = Some(block.data_addr);
        }
        channel
    }

    pub fn with_channel_type(mut self, channel_type: ChannelType) -> Self {
        self.channel_type = channel_type;
        self
    }

    pub fn with_data_address(mut self, address: u64) -> Self {
        self.data_address = Some(address);
        self
    }

    pub fn with_conversion(mut self, conversion: Conversion) -> Self {
        self.conversion = Some(conversion);
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Use invalidation bit `pos` of the record's invalidation bytes.
    pub fn with_invalidation_bit(mut self, pos: u32) -> Self {
        self.flags |= CN_FLAG_INVAL_BIT;
        self.pos_invalidation_bit = pos;
        self
    }

    #[inline]
    pub fn is_vlsd(&self) -> bool {
        self.channel_type == ChannelType::VariableLength
    }

    #[inline]
    pub fn is_master(&self) -> bool {
        matches!(
            self.channel_type,
            ChannelType::Master | ChannelType::VirtualMaster
        )
    }

    /// Position of the value inside a record that starts with a record ID of
    /// `record_id_size` bytes.
    pub fn field_layout(&self, record_id_size: u8) -> Result<FieldLayout> {
        FieldLayout::new(
            self.data_type,
            usize::from(record_id_size) + self.byte_offset as usize,
            self.bit_offset,
            self.bit_count,
        )
    }

    /// Validity rule derived from the channel flags.
    pub fn validity_rule(&self, group: &ChannelGroup) -> ValidityRule {
        if self.flags & CN_FLAG_ALL_INVALID != 0 {
            ValidityRule::AllInvalid
        } else if self.flags & CN_FLAG_INVAL_BIT == 0 {
            ValidityRule::AllValid
        } else {
            let pos = self.pos_invalidation_bit;
            let byte = usize::from(group.record_id_size)
                + group.data_bytes as usize
                + (pos >> 3) as usize;
            ValidityRule::Bit(FieldLayout::bit(byte, (pos & 7) as u8))
        }
    }

    pub(crate) fn cached(&self) -> Option<Samples> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn store(&self, samples: Samples) {
        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = Some(samples);
    }

    pub(crate) fn clear_cache(&self) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// True when decoded samples are cached.
    pub fn is_cached(&self) -> bool {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

/// How the validity of a channel's samples is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidityRule {
    AllValid,
    AllInvalid,
    /// A set bit at this position marks the record's sample invalid.
    Bit(FieldLayout),
}
