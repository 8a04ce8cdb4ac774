//! Data block dispatch.
//!
//! [`Dispatcher::run`] walks the block graph starting at one address and
//! hands every raw payload, in stream order, to a [`FragmentSink`].

use log::{debug, trace, warn};

use crate::blocks::{BlockKind, BlockParse, DataBlock, DzBlock, HeaderListBlock, SignalDataBlock};
use crate::parsing::chain::DataListChain;
use crate::parsing::inflate::inflate;
use crate::source::ByteSource;
use crate::{Error, Result};

/// Record framing of the channel being read, chosen once per extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    /// Fixed-stride records in DT/DV blocks.
    FixedLength,
    /// Length-prefixed records in SD blocks.
    VariableLength,
}

/// Receiver of raw payload fragments.
pub trait FragmentSink {
    fn accept(&mut self, fragment: &[u8]) -> Result<()>;
}

impl<F> FragmentSink for F
where
    F: FnMut(&[u8]) -> Result<()>,
{
    fn accept(&mut self, fragment: &[u8]) -> Result<()> {
        self(fragment)
    }
}

pub struct Dispatcher<'s, S: ByteSource + ?Sized> {
    source: &'s S,
    shape: RecordShape,
    max_depth: usize,
}

impl<'s, S: ByteSource + ?Sized> Dispatcher<'s, S> {
    pub fn new(source: &'s S, shape: RecordShape, max_depth: usize) -> Self {
        Self {
            source,
            shape,
            max_depth,
        }
    }

    /// Feed every payload reachable from `address` to `sink`.
    pub fn run(&self, address: u64, sink: &mut dyn FragmentSink) -> Result<()> {
        self.visit(address, 0, sink)
    }

    fn visit(&self, address: u64, depth: usize, sink: &mut dyn FragmentSink) -> Result<()> {
        if depth > self.max_depth {
            return Err(Error::BlockChainTooDeep {
                max_depth: self.max_depth,
            });
        }

        let header = self.source.read_header(address)?;
        let kind = header.kind();
        trace!("visiting {} at {address:#x} (depth {depth})", header.id_str());

        match kind {
            BlockKind::DataList => {
                debug!("entering data list at {address:#x}");
                self.walk(DataListChain::new(self.source, address), depth, sink)
            }
            BlockKind::HeaderList => {
                let block = self.source.read_block(address)?;
                let hl = HeaderListBlock::from_bytes(&block)?;
                debug!(
                    "entering compressed list at {address:#x}, first node {:#x}",
                    hl.first_dl
                );
                self.walk(
                    DataListChain::new(self.source, hl.first_dl).compressed(),
                    depth,
                    sink,
                )
            }
            BlockKind::Compressed => {
                let block = self.source.read_block(address)?;
                let dz = DzBlock::from_bytes(&block)?;
                let claimed = dz.claimed_kind();
                self.check_payload_kind(claimed, "compressed block payload")?;
                let raw = inflate(&dz)?;
                debug!(
                    "inflated {:?} at {address:#x}: {} -> {} bytes",
                    claimed,
                    dz.data.len(),
                    raw.len()
                );
                sink.accept(&raw)
            }
            _ => {
                self.check_payload_kind(kind, "data block")?;
                let block = self.source.read_block(address)?;
                let payload = match kind {
                    BlockKind::SignalData => SignalDataBlock::from_bytes(&block)?.data,
                    _ => DataBlock::from_bytes(&block)?.data,
                };
                sink.accept(payload)
            }
        }
    }

    fn walk(
        &self,
        chain: DataListChain<'_, S>,
        depth: usize,
        sink: &mut dyn FragmentSink,
    ) -> Result<()> {
        for entry in chain {
            let entry = entry?;
            if entry.compressed {
                let child = self.source.read_header(entry.address)?;
                if child.kind() != BlockKind::Compressed {
                    warn!(
                        "block {} at {:#x} in a compressed list is not a DZ block",
                        child.id_str(),
                        entry.address
                    );
                }
            }
            self.visit(entry.address, depth + 1, sink)?;
        }
        Ok(())
    }

    /// Reject payload kinds the current record shape cannot consume.
    fn check_payload_kind(&self, kind: BlockKind, context: &'static str) -> Result<()> {
        match (kind, self.shape) {
            (BlockKind::Data | BlockKind::DataValues, RecordShape::FixedLength) => Ok(()),
            (BlockKind::SignalData, RecordShape::VariableLength) => Ok(()),
            (BlockKind::Data | BlockKind::DataValues, RecordShape::VariableLength) => {
                Err(Error::UnsupportedBlockKind {
                    tag: kind.tag(),
                    context: "record data under a VLSD channel is not yet supported",
                })
            }
            (BlockKind::SignalData, RecordShape::FixedLength) => Err(Error::UnsupportedBlockKind {
                tag: kind.tag(),
                context: "signal data under a fixed-length channel",
            }),
            _ => Err(Error::UnsupportedBlockKind {
                tag: kind.tag(),
                context,
            }),
        }
    }
}
