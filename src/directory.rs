//! Serializable listing of the groups and channels of a file.
//!
//! A [`Directory`] carries no samples, only what is needed to find and
//! describe channels. With the `serde` feature it can be exported as JSON.

use crate::blocks::{Conversion, DataType};
use crate::channel::{Channel, ChannelType};
use crate::channel_group::ChannelGroup;

/// Description of one channel.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelEntry {
    pub name: String,
    pub unit: Option<String>,
    pub comment: Option<String>,
    pub channel_type: ChannelType,
    pub data_type: DataType,
    /// Byte offset within the record's data bytes
    pub byte_offset: u32,
    pub bit_offset: u8,
    pub bit_count: u32,
    /// Name of the group's master channel, for non-master channels
    pub master: Option<String>,
    pub conversion: Option<Conversion>,
}

impl From<&Channel> for ChannelEntry {
    fn from(channel: &Channel) -> Self {
        Self {
            name: channel.name.clone(),
            unit: channel.unit.clone(),
            comment: channel.comment.clone(),
            channel_type: channel.channel_type,
            data_type: channel.data_type,
            byte_offset: channel.byte_offset,
            bit_offset: channel.bit_offset,
            bit_count: channel.bit_count,
            master: channel.master.clone(),
            conversion: channel.conversion.clone(),
        }
    }
}

/// Description of one channel group.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupEntry {
    pub name: Option<String>,
    /// Index of the owning data group
    pub data_group: usize,
    pub record_id: u64,
    /// Number of records in this group
    pub cycle_count: u64,
    /// Bytes per record including record ID and invalidation bytes
    pub record_stride: usize,
    pub channels: Vec<ChannelEntry>,
}

impl From<&ChannelGroup> for GroupEntry {
    fn from(group: &ChannelGroup) -> Self {
        Self {
            name: group.name.clone(),
            data_group: group.data_group,
            record_id: group.record_id,
            cycle_count: group.cycle_count,
            record_stride: group.record_stride(),
            channels: group.channels.iter().map(ChannelEntry::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Directory {
    /// Format version, e.g. 410
    pub version: Option<u16>,
    pub program: Option<String>,
    /// Start of the recording in nanoseconds since the Unix epoch
    pub start_time_ns: Option<u64>,
    pub groups: Vec<GroupEntry>,
}

impl Directory {
    /// All channel entries, in file order.
    pub fn channels(&self) -> impl Iterator<Item = &ChannelEntry> {
        self.groups.iter().flat_map(|g| g.channels.iter())
    }

    /// Total number of channels.
    pub fn channel_count(&self) -> usize {
        self.groups.iter().map(|g| g.channels.len()).sum()
    }
}

#[cfg(feature = "serde")]
impl Directory {
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            crate::Error::Serialization(format!("JSON serialization failed: {e}"))
        })
    }

    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            crate::Error::Serialization(format!("JSON deserialization failed: {e}"))
        })
    }

    /// Write the directory as pretty-printed JSON.
    pub fn save_to_file(&self, path: impl AsRef<std::path::Path>) -> crate::Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(crate::Error::IOError)?;
        Ok(())
    }

    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let json = std::fs::read_to_string(path).map_err(crate::Error::IOError)?;
        Self::from_json(&json)
    }
}
