use std::path::Path;

use log::debug;

use crate::blocks::{HeaderBlock, IdentificationBlock};
use crate::channel::{Channel, Samples};
use crate::channel_group::ChannelGroup;
use crate::data_group::DataGroup;
use crate::directory::{Directory, GroupEntry};
use crate::extractor::{Extractor, ReadOptions};
use crate::parsing::read_container;
use crate::source::{ByteSource, FileSource, MemorySource};
use crate::types::DecodedValue;
use crate::{Error, Result};

/// An opened MDF4 file.
///
/// The metadata blocks are read once when the file is opened. Samples are
/// decoded on demand and cached per channel unless
/// [`ReadOptions::memory_optimized`] is set.
///
/// `Mdf` is `Sync` whenever its byte source is, so channels can be
/// extracted from several threads at once.
#[derive(Debug)]
pub struct Mdf<S: ByteSource = FileSource> {
    source: S,
    options: ReadOptions,
    identification: Option<IdentificationBlock>,
    header: Option<HeaderBlock>,
    data_groups: Vec<DataGroup>,
    channel_groups: Vec<ChannelGroup>,
}

impl Mdf<FileSource> {
    /// Open an MDF4 file from disk with default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, ReadOptions::default())
    }

    pub fn open_with(path: impl AsRef<Path>, options: ReadOptions) -> Result<Self> {
        let path = path.as_ref();
        debug!("opening {}", path.display());
        Self::with_source(FileSource::open(path)?, options)
    }
}

impl Mdf<MemorySource> {
    /// Read an MDF4 file held in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::with_source(MemorySource::new(bytes), ReadOptions::default())
    }
}

impl<S: ByteSource> Mdf<S> {
    /// Read the metadata blocks of `source`.
    pub fn with_source(source: S, options: ReadOptions) -> Result<Self> {
        let container = read_container(&source)?;
        debug!(
            "MDF {} with {} data groups, {} channel groups",
            container.identification.version_number,
            container.data_groups.len(),
            container.channel_groups.len()
        );
        Ok(Self {
            source,
            options,
            identification: Some(container.identification),
            header: Some(container.header),
            data_groups: container.data_groups,
            channel_groups: container.channel_groups,
        })
    }

    /// Assemble a container from descriptors built elsewhere.
    ///
    /// Every channel group must name an existing data group.
    pub fn from_parts(
        source: S,
        options: ReadOptions,
        data_groups: Vec<DataGroup>,
        channel_groups: Vec<ChannelGroup>,
    ) -> Result<Self> {
        if let Some(group) = channel_groups
            .iter()
            .find(|g| g.data_group >= data_groups.len())
        {
            return Err(Error::InvalidLayout(format!(
                "channel group {:?} refers to data group {} of {}",
                group.name,
                group.data_group,
                data_groups.len()
            )));
        }
        Ok(Self {
            source,
            options,
            identification: None,
            header: None,
            data_groups,
            channel_groups,
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn options(&self) -> ReadOptions {
        self.options
    }

    /// Format version number, e.g. 410 for MDF 4.10.
    pub fn version(&self) -> Option<u16> {
        self.identification.as_ref().map(|id| id.version_number)
    }

    /// Recording start in nanoseconds since the Unix epoch.
    pub fn start_time_ns(&self) -> Option<u64> {
        self.header.as_ref().map(|hd| hd.abs_time)
    }

    pub fn channel_groups(&self) -> &[ChannelGroup] {
        &self.channel_groups
    }

    pub fn data_groups(&self) -> &[DataGroup] {
        &self.data_groups
    }

    /// Names of all channels, in file order.
    pub fn channel_names(&self) -> Vec<&str> {
        self.channel_groups
            .iter()
            .flat_map(|g| g.channels.iter())
            .map(|c| c.name.as_str())
            .collect()
    }

    /// First channel called `name`, in file order.
    pub fn find_channel(&self, name: &str) -> Option<&Channel> {
        self.channel_groups.iter().find_map(|g| g.channel(name))
    }

    pub fn channel(&self, name: &str) -> Result<&Channel> {
        self.find_channel(name)
            .ok_or_else(|| Error::ChannelNotFound(name.to_string()))
    }

    /// The data group that owns `group`.
    pub fn data_group_of(&self, group: &ChannelGroup) -> Result<&DataGroup> {
        self.data_groups.get(group.data_group).ok_or_else(|| {
            Error::InvalidLayout(format!(
                "channel group {:?} refers to missing data group {}",
                group.name, group.data_group
            ))
        })
    }

    fn locate(&self, name: &str) -> Result<(&Channel, &ChannelGroup, &DataGroup)> {
        for group in &self.channel_groups {
            if let Some(channel) = group.channel(name) {
                return Ok((channel, group, self.data_group_of(group)?));
            }
        }
        Err(Error::ChannelNotFound(name.to_string()))
    }

    /// An extractor over this file's byte source.
    pub fn extractor(&self) -> Extractor<'_, S> {
        Extractor::new(&self.source, self.options)
    }

    /// Physical samples of the channel called `name`.
    pub fn sample(&self, name: &str) -> Result<Samples> {
        let (channel, group, dg) = self.locate(name)?;
        self.extractor().sample(channel, group, dg)
    }

    /// Samples of `name` as stored in the file, without conversion.
    pub fn raw_sample(&self, name: &str) -> Result<Vec<DecodedValue>> {
        let (channel, group, dg) = self.locate(name)?;
        self.extractor().raw_sample(channel, group, dg)
    }

    /// Validity flag of every sample of `name`.
    pub fn validity(&self, name: &str) -> Result<Vec<bool>> {
        let (channel, group, dg) = self.locate(name)?;
        self.extractor().validity(channel, group, dg)
    }

    /// Drop the cached samples of `name` and decode them again.
    pub fn reread(&self, name: &str) -> Result<Samples> {
        let (channel, group, dg) = self.locate(name)?;
        self.extractor().reread(channel, group, dg)
    }

    /// Samples of the master channel of the group `name` belongs to.
    ///
    /// Returns `None` when the group has no master channel.
    pub fn master_sample(&self, name: &str) -> Result<Option<Samples>> {
        let (_, group, dg) = self.locate(name)?;
        match group.master() {
            Some(master) => self.extractor().sample(master, group, dg).map(Some),
            None => Ok(None),
        }
    }

    /// Serializable listing of all groups and channels.
    pub fn directory(&self) -> Directory {
        Directory {
            version: self.version(),
            program: self
                .identification
                .as_ref()
                .map(|id| id.program_id.trim_end().to_string()),
            start_time_ns: self.start_time_ns(),
            groups: self.channel_groups.iter().map(GroupEntry::from).collect(),
        }
    }
}
