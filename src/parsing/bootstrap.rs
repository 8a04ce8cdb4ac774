//! Container bootstrap: walks the ID, HD, DG, CG and CN blocks and builds
//! the data model the extractor works on.

use std::collections::HashSet;

use log::{debug, warn};

use crate::blocks::{
    BlockParse, CG_FLAG_VLSD, ChannelBlock, ChannelGroupBlock, Conversion, ConversionBlock,
    ConversionType, DataGroupBlock, HeaderBlock, ID_BLOCK_SIZE, IdentificationBlock, TextBlock,
};
use crate::channel::Channel;
use crate::channel_group::ChannelGroup;
use crate::data_group::{DataGroup, RecordSize};
use crate::source::ByteSource;
use crate::{Error, Result};

/// Everything read from the metadata blocks of a file.
#[derive(Debug)]
pub(crate) struct Container {
    pub identification: IdentificationBlock,
    pub header: HeaderBlock,
    pub data_groups: Vec<DataGroup>,
    /// Channel groups of all data groups, in file order.
    pub channel_groups: Vec<ChannelGroup>,
}

/// Reader of metadata blocks that refuses to visit any block twice.
struct Walker<'s, S: ByteSource + ?Sized> {
    source: &'s S,
    visited: HashSet<u64>,
}

impl<'s, S: ByteSource + ?Sized> Walker<'s, S> {
    fn block(&mut self, address: u64) -> Result<Vec<u8>> {
        if !self.visited.insert(address) {
            return Err(Error::BlockChainCycle { address });
        }
        self.source.read_block(address)
    }

    /// Text of a TX or MD block; `None` for a zero link.
    ///
    /// Text blocks may be shared between channels, so they bypass the cycle
    /// check.
    fn text(&self, address: u64) -> Result<Option<String>> {
        if address == 0 {
            return Ok(None);
        }
        let bytes = self.source.read_block(address)?;
        Ok(Some(TextBlock::from_bytes(&bytes)?.text))
    }

    /// Like [`Walker::text`] but yields `None` for non-text blocks, such as
    /// nested conversions in a value-to-text table.
    fn text_if_any(&self, address: u64) -> Result<Option<String>> {
        match &self.source.read_header(address)?.id {
            b"##TX" | b"##MD" => self.text(address),
            _ => Ok(None),
        }
    }

    fn conversion(&self, address: u64, channel: &str) -> Result<Option<Conversion>> {
        if address == 0 {
            return Ok(None);
        }
        let bytes = self.source.read_block(address)?;
        let block = ConversionBlock::from_bytes(&bytes)?;
        let conversion = Conversion::from_block(&block, |link| self.text_if_any(link))?;
        if let Conversion::Unsupported(code) = &conversion {
            let kind = ConversionType::from_u8(*code).name();
            warn!(
                "{kind} conversion (type {code}) of channel {channel:?} is not evaluated, \
                 using raw values"
            );
        }
        Ok(Some(conversion))
    }

    fn channel(&mut self, address: u64) -> Result<(Channel, u64)> {
        let bytes = self.block(address)?;
        let block = ChannelBlock::from_bytes(&bytes)?;
        let name = self.text(block.name_addr)?.unwrap_or_default();

        let mut channel = Channel::from_block(&block, name);
        channel.unit = self.text(block.unit_addr)?;
        channel.comment = self.text(block.comment_addr)?;
        channel.conversion = self.conversion(block.conversion_addr, &channel.name)?;
        Ok((channel, block.next_ch_addr))
    }

    fn channel_group(
        &mut self,
        address: u64,
        record_id_size: u8,
        data_group: usize,
    ) -> Result<(ChannelGroup, u64)> {
        let bytes = self.block(address)?;
        let block = ChannelGroupBlock::from_bytes(&bytes)?;

        let mut group = ChannelGroup::from_block(&block, record_id_size, data_group);
        group.name = self.text(block.acq_name_addr)?;

        let mut cn_addr = block.first_ch_addr;
        while cn_addr != 0 {
            let (channel, next) = self.channel(cn_addr)?;
            group.channels.push(channel);
            cn_addr = next;
        }

        let master = group.master().map(|m| m.name.clone());
        if let Some(master) = master {
            for channel in group.channels.iter_mut().filter(|c| !c.is_master()) {
                channel.master = Some(master.clone());
            }
        }

        debug!(
            "channel group {:?}: {} channels, {} records",
            group.name,
            group.channels.len(),
            group.cycle_count
        );
        Ok((group, block.next_cg_addr))
    }
}

/// Read the metadata blocks of `source`.
pub(crate) fn read_container<S: ByteSource + ?Sized>(source: &S) -> Result<Container> {
    let id_bytes = source.read_at(0, ID_BLOCK_SIZE)?;
    let identification = IdentificationBlock::from_bytes(&id_bytes)?;

    let mut walker = Walker {
        source,
        visited: HashSet::new(),
    };
    let hd_bytes = walker.block(ID_BLOCK_SIZE as u64)?;
    let header = HeaderBlock::from_bytes(&hd_bytes)?;

    let mut data_groups = Vec::new();
    let mut channel_groups = Vec::new();
    let mut dg_addr = header.first_dg_addr;
    while dg_addr != 0 {
        let bytes = walker.block(dg_addr)?;
        let block = DataGroupBlock::from_bytes(&bytes)?;
        let index = data_groups.len();
        let mut data_group = DataGroup::new(block.data_block_addr, block.record_id_size);

        let mut cg_addr = block.first_cg_addr;
        while cg_addr != 0 {
            let (group, next) = walker.channel_group(cg_addr, block.record_id_size, index)?;
            let size = if group.flags & CG_FLAG_VLSD != 0 {
                RecordSize::Variable
            } else {
                RecordSize::Fixed(group.data_bytes as usize + group.invalidation_bytes as usize)
            };
            data_group = data_group.with_record_layout(group.record_id, size);
            channel_groups.push(group);
            cg_addr = next;
        }

        debug!(
            "data group {index} at {dg_addr:#x}: data at {:#x}, {} channel groups",
            data_group.data_address,
            data_group.record_layouts.len()
        );
        data_groups.push(data_group);
        dg_addr = block.next_dg_addr;
    }

    Ok(Container {
        identification,
        header,
        data_groups,
        channel_groups,
    })
}
