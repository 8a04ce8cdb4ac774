//! Sample extraction.
//!
//! [`Extractor`] ties the data model to the block engine: it resolves where
//! a channel's bytes live, drives the [`Dispatcher`] into the matching
//! reader, applies the channel conversion and maintains the caches.

use std::sync::Arc;

use log::debug;

use crate::channel::{Channel, Samples, ValidityRule};
use crate::channel_group::ChannelGroup;
use crate::data_group::{DataGroup, Fragments, RecordStreams};
use crate::parsing::decoder::{ByteOrder, FieldLayout, ValueKind};
use crate::parsing::dispatcher::{Dispatcher, FragmentSink, RecordShape};
use crate::parsing::record_reader::RecordReader;
use crate::parsing::vlsd_reader::VlsdReader;
use crate::source::ByteSource;
use crate::types::DecodedValue;
use crate::{Error, Result};

/// Default limit for nested DL/HL indirections.
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 16;

/// Runtime options of a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Never cache decoded samples or raw fragments; every call re-decodes.
    pub memory_optimized: bool,
    /// Maximum nesting of list blocks below the start address.
    pub max_chain_depth: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            memory_optimized: false,
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
        }
    }
}

impl ReadOptions {
    pub fn memory_optimized() -> Self {
        Self {
            memory_optimized: true,
            ..Self::default()
        }
    }
}

pub struct Extractor<'s, S: ByteSource + ?Sized> {
    source: &'s S,
    options: ReadOptions,
}

impl<'s, S: ByteSource + ?Sized> Extractor<'s, S> {
    pub fn new(source: &'s S, options: ReadOptions) -> Self {
        Self { source, options }
    }

    pub fn options(&self) -> ReadOptions {
        self.options
    }

    /// Physical samples of `channel`, conversion applied.
    ///
    /// Returns the cached samples when present. Any error aborts the whole
    /// extraction and nothing is cached.
    pub fn sample(
        &self,
        channel: &Channel,
        group: &ChannelGroup,
        data_group: &DataGroup,
    ) -> Result<Samples> {
        if !self.options.memory_optimized {
            if let Some(samples) = channel.cached() {
                return Ok(samples);
            }
        }

        let raw = self.raw_sample(channel, group, data_group)?;
        let samples: Samples = match &channel.conversion {
            Some(conversion) if !conversion.is_identity() => {
                raw.iter().map(|v| conversion.apply(v)).collect()
            }
            _ => raw.into(),
        };

        if !self.options.memory_optimized {
            channel.store(Arc::clone(&samples));
        }
        Ok(samples)
    }

    /// Drop the channel's cached samples and decode them again.
    ///
    /// The data group's fragment cache is kept.
    pub fn reread(
        &self,
        channel: &Channel,
        group: &ChannelGroup,
        data_group: &DataGroup,
    ) -> Result<Samples> {
        channel.clear_cache();
        self.sample(channel, group, data_group)
    }

    /// Samples as stored in the file, without conversion and without caching.
    pub fn raw_sample(
        &self,
        channel: &Channel,
        group: &ChannelGroup,
        data_group: &DataGroup,
    ) -> Result<Vec<DecodedValue>> {
        debug!(
            "extracting {:?}: {} records of {} bytes",
            channel.name,
            group.cycle_count,
            group.record_stride()
        );
        let values = if channel.is_vlsd() {
            self.read_vlsd(channel, group, data_group)?
        } else {
            let layout = channel.field_layout(group.record_id_size)?;
            let address = channel.data_address.unwrap_or(data_group.data_address);
            self.read_fixed(layout, address, group, data_group)?
        };
        debug!("extracted {} samples of {:?}", values.len(), channel.name);
        Ok(values)
    }

    /// One flag per record, `true` when the sample is valid.
    pub fn validity(
        &self,
        channel: &Channel,
        group: &ChannelGroup,
        data_group: &DataGroup,
    ) -> Result<Vec<bool>> {
        let count = crate::blocks::u64_to_usize(group.cycle_count, "cycle count")?;
        match channel.validity_rule(group) {
            ValidityRule::AllValid => Ok(vec![true; count]),
            ValidityRule::AllInvalid => Ok(vec![false; count]),
            ValidityRule::Bit(layout) => {
                let bits =
                    self.read_fixed(layout, data_group.data_address, group, data_group)?;
                Ok(bits
                    .iter()
                    .map(|bit| !matches!(bit, DecodedValue::UInt8(1)))
                    .collect())
            }
        }
    }

    fn read_fixed(
        &self,
        layout: FieldLayout,
        address: u64,
        group: &ChannelGroup,
        data_group: &DataGroup,
    ) -> Result<Vec<DecodedValue>> {
        let mut reader = RecordReader::new(layout, group.record_stride(), group.cycle_count)?;
        if group.cycle_count == 0 {
            return reader.finish();
        }
        if address == 0 {
            return Err(Error::RecordCountMismatch {
                expected: group.cycle_count,
                actual: 0,
            });
        }

        let shared_graph = address == data_group.data_address;
        if shared_graph && data_group.is_unsorted() {
            let streams = self.record_streams(data_group)?;
            if let Some(records) = streams.get(&group.record_id) {
                reader.accept(records)?;
            }
        } else if shared_graph && !self.options.memory_optimized {
            for fragment in self.fragments(data_group)?.iter() {
                reader.accept(fragment)?;
            }
        } else {
            self.dispatcher(RecordShape::FixedLength)
                .run(address, &mut reader)?;
        }
        reader.finish()
    }

    fn read_vlsd(
        &self,
        channel: &Channel,
        group: &ChannelGroup,
        data_group: &DataGroup,
    ) -> Result<Vec<DecodedValue>> {
        let address = channel.data_address.unwrap_or(data_group.data_address);
        if address == 0 {
            if group.cycle_count == 0 {
                return Ok(Vec::new());
            }
            return Err(Error::RecordCountMismatch {
                expected: group.cycle_count,
                actual: 0,
            });
        }

        let kind = ValueKind::resolve(channel.data_type, 0, channel.bit_count)?;
        let order = if channel.data_type.is_big_endian() {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        };
        let mut reader = VlsdReader::new(kind, order, group.cycle_count);
        self.dispatcher(RecordShape::VariableLength)
            .run(address, &mut reader)?;
        reader.finish()
    }

    fn dispatcher(&self, shape: RecordShape) -> Dispatcher<'s, S> {
        Dispatcher::new(self.source, shape, self.options.max_chain_depth)
    }

    fn load_fragments(&self, data_group: &DataGroup) -> Result<Vec<Vec<u8>>> {
        let mut fragments = Vec::new();
        let mut collect = |fragment: &[u8]| -> Result<()> {
            fragments.push(fragment.to_vec());
            Ok(())
        };
        self.dispatcher(RecordShape::FixedLength)
            .run(data_group.data_address, &mut collect)?;
        debug!(
            "loaded {} fragments from data group at {:#x}",
            fragments.len(),
            data_group.data_address
        );
        Ok(fragments)
    }

    /// Raw fragments of the data group's block graph.
    fn fragments(&self, data_group: &DataGroup) -> Result<Fragments> {
        if self.options.memory_optimized {
            Ok(self.load_fragments(data_group)?.into())
        } else {
            data_group.fragments_or_load(|| self.load_fragments(data_group))
        }
    }

    /// Records of an unsorted data group split by record ID. The split is
    /// done once per data group unless memory-optimized.
    fn record_streams(&self, data_group: &DataGroup) -> Result<RecordStreams> {
        let split = || {
            let stream = self.load_fragments(data_group)?.concat();
            data_group.split_records(&stream)
        };
        if self.options.memory_optimized {
            Ok(split()?.into())
        } else {
            data_group.streams_or_load(split)
        }
    }
}

impl<S: ByteSource + ?Sized> Clone for Extractor<'_, S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source,
            options: self.options,
        }
    }
}
