use crate::blocks::ChannelGroupBlock;
use crate::channel::Channel;

/// Record layout shared by the channels of one group.
#[derive(Debug)]
pub struct ChannelGroup {
    pub name: Option<String>,
    pub record_id: u64,
    /// Number of records.
    pub cycle_count: u64,
    /// Data bytes per record, excluding record ID and invalidation bytes.
    pub data_bytes: u32,
    pub invalidation_bytes: u32,
    /// Record ID width inherited from the data group.
    pub record_id_size: u8,
    pub flags: u16,
    /// Index of the owning data group in the container.
    pub data_group: usize,
    pub channels: Vec<Channel>,
}

impl ChannelGroup {
    pub fn new(cycle_count: u64, data_bytes: u32, record_id_size: u8) -> Self {
        Self {
            name: None,
            record_id: 0,
            cycle_count,
            data_bytes,
            invalidation_bytes: 0,
            record_id_size,
            flags: 0,
            data_group: 0,
            channels: Vec::new(),
        }
    }

    pub(crate) fn from_block(
        block: &ChannelGroupBlock,
        record_id_size: u8,
        data_group: usize,
    ) -> Self {
        Self {
            name: None,
            record_id: block.record_id,
            cycle_count: block.cycles_nr,
            data_bytes: block.samples_byte_nr,
            invalidation_bytes: block.invalidation_bytes_nr,
            record_id_size,
            flags: block.flags,
            data_group,
            channels: Vec::new(),
        }
    }

    pub fn with_invalidation_bytes(mut self, bytes: u32) -> Self {
        self.invalidation_bytes = bytes;
        self
    }

    pub fn with_record_id(mut self, record_id: u64) -> Self {
        self.record_id = record_id;
        self
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channels.push(channel);
        self
    }

    /// Bytes per record: record ID, data bytes and invalidation bytes.
    #[inline]
    pub fn record_stride(&self) -> usize {
        usize::from(self.record_id_size)
            + self.data_bytes as usize
            + self.invalidation_bytes as usize
    }

    /// First channel called `name`.
    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.name == name)
    }

    pub fn master(&self) -> Option<&Channel> {
        self.channels.iter().find(|c| c.is_master())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::DataType;

    #[test]
    fn stride_counts_all_record_parts() {
        let group = ChannelGroup::new(3, 6, 2).with_invalidation_bytes(1);
        assert_eq!(group.record_stride(), 9);
    }

    #[test]
    fn channel_lookup_by_name() {
        let group = ChannelGroup::new(0, 4, 0)
            .with_channel(Channel::new("a", DataType::UnsignedIntegerLE, 0, 0, 16))
            .with_channel(Channel::new("b", DataType::UnsignedIntegerLE, 2, 0, 16));
        assert_eq!(group.channel("b").map(|c| c.byte_offset), Some(2));
        assert!(group.channel("c").is_none());
        assert!(group.master().is_none());
    }
}
