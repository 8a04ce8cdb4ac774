//! Lazy traversal of DL chains.

use std::collections::HashSet;

use log::trace;

use crate::blocks::{BlockParse, DataListBlock};
use crate::source::ByteSource;
use crate::{Error, Result};

/// One child block met while walking a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainEntry {
    pub address: u64,
    /// The chain hangs below an HL block, so the child should be a DZ.
    pub compressed: bool,
}

/// Iterator over the children of a DL chain, following `next` links.
///
/// Nodes are fetched one at a time as the previous node's children run
/// out. A node that links back to an already visited node ends the
/// iteration with [`Error::BlockChainCycle`].
pub struct DataListChain<'s, S: ByteSource + ?Sized> {
    source: &'s S,
    next_node: u64,
    children: std::vec::IntoIter<u64>,
    compressed: bool,
    visited: HashSet<u64>,
    done: bool,
}

impl<'s, S: ByteSource + ?Sized> DataListChain<'s, S> {
    pub fn new(source: &'s S, first_node: u64) -> Self {
        Self {
            source,
            next_node: first_node,
            children: Vec::new().into_iter(),
            compressed: false,
            visited: HashSet::new(),
            done: false,
        }
    }

    /// Mark every child as expected to be DZ compressed.
    pub fn compressed(mut self) -> Self {
        self.compressed = true;
        self
    }

    fn load_next_node(&mut self) -> Result<()> {
        let address = self.next_node;
        if !self.visited.insert(address) {
            return Err(Error::BlockChainCycle { address });
        }
        let bytes = self.source.read_block(address)?;
        let node = DataListBlock::from_bytes(&bytes)?;
        trace!(
            "DL node at {address:#x}: {} children, next {:#x}",
            node.data_links.len(),
            node.next
        );
        self.next_node = node.next;
        self.children = node.children().collect::<Vec<_>>().into_iter();
        Ok(())
    }
}

impl<S: ByteSource + ?Sized> Iterator for DataListChain<'_, S> {
    type Item = Result<ChainEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(address) = self.children.next() {
                return Some(Ok(ChainEntry {
                    address,
                    compressed: self.compressed,
                }));
            }
            if self.done || self.next_node == 0 {
                return None;
            }
            if let Err(e) = self.load_next_node() {
                self.done = true;
                return Some(Err(e));
            }
        }
    }
}
