//! Variable-length signal data reading.

use log::trace;

use crate::parsing::decoder::{ByteOrder, ValueKind, decode};
use crate::parsing::dispatcher::FragmentSink;
use crate::types::DecodedValue;
use crate::{Error, Result};

/// Size of the little-endian length prefix of every SD record.
const LENGTH_PREFIX: usize = 4;

/// Cap on the preallocation taken from a file-declared cycle count.
const MAX_PREALLOCATED: u64 = 1 << 16;

/// Decodes the `[u32 length][bytes]` records of the SD payloads it is fed.
///
/// A record may be split between two payloads, prefix included. Its first
/// part is kept until the next payload completes it.
#[derive(Debug)]
pub struct VlsdReader {
    kind: ValueKind,
    order: ByteOrder,
    expected: u64,
    remaining: u64,
    /// Leading bytes of a record cut by the end of the last payload.
    partial: Vec<u8>,
    values: Vec<DecodedValue>,
}

impl VlsdReader {
    /// Read `cycle_count` records.
    pub fn new(kind: ValueKind, order: ByteOrder, cycle_count: u64) -> Self {
        Self {
            kind,
            order,
            expected: cycle_count,
            remaining: cycle_count,
            partial: Vec::new(),
            values: Vec::with_capacity(cycle_count.min(MAX_PREALLOCATED) as usize),
        }
    }

    /// Number of records decoded so far.
    pub fn records_seen(&self) -> u64 {
        self.expected - self.remaining
    }

    /// The decoded values. Fails when a record was left incomplete or fewer
    /// than `cycle_count` records were found.
    pub fn finish(self) -> Result<Vec<DecodedValue>> {
        if !self.partial.is_empty() {
            let (required, actual) = match record_length(&self.partial) {
                Some(length) => (length, self.partial.len() - LENGTH_PREFIX),
                None => (LENGTH_PREFIX, self.partial.len()),
            };
            return Err(Error::InsufficientData {
                required,
                actual,
                kind: "signal data record",
            });
        }
        if self.remaining > 0 {
            return Err(Error::RecordCountMismatch {
                expected: self.expected,
                actual: self.records_seen(),
            });
        }
        Ok(self.values)
    }

    fn push(&mut self, body: &[u8]) -> Result<()> {
        let bits = match self.kind.byte_width() {
            None => body.len() * 8,
            Some(width) => width * 8,
        };
        let value = decode(body, self.order, self.kind, 0, bits as u32)?;
        self.values.push(value);
        self.remaining -= 1;
        Ok(())
    }

    /// Extend the pending record from `fragment` and return what is left.
    fn complete_partial<'f>(&mut self, fragment: &'f [u8]) -> Result<&'f [u8]> {
        let mut rest = fragment;
        if self.partial.len() < LENGTH_PREFIX {
            let take = (LENGTH_PREFIX - self.partial.len()).min(rest.len());
            self.partial.extend_from_slice(&rest[..take]);
            rest = &rest[take..];
        }
        let Some(length) = record_length(&self.partial) else {
            return Ok(rest);
        };

        let missing = LENGTH_PREFIX.saturating_add(length) - self.partial.len();
        let take = missing.min(rest.len());
        self.partial.extend_from_slice(&rest[..take]);
        rest = &rest[take..];
        if take == missing {
            let record = std::mem::take(&mut self.partial);
            self.push(&record[LENGTH_PREFIX..])?;
        }
        Ok(rest)
    }
}

/// Declared body length of the record starting at `bytes`, once the whole
/// prefix is present.
fn record_length(bytes: &[u8]) -> Option<usize> {
    let prefix: [u8; LENGTH_PREFIX] = bytes.get(..LENGTH_PREFIX)?.try_into().ok()?;
    Some(u32::from_le_bytes(prefix) as usize)
}

impl FragmentSink for VlsdReader {
    fn accept(&mut self, fragment: &[u8]) -> Result<()> {
        let mut rest = fragment;
        if !self.partial.is_empty() {
            rest = self.complete_partial(rest)?;
        }

        while self.remaining > 0 && !rest.is_empty() {
            match record_length(rest) {
                Some(length) if rest.len() - LENGTH_PREFIX >= length => {
                    let (record, tail) = rest.split_at(LENGTH_PREFIX + length);
                    self.push(&record[LENGTH_PREFIX..])?;
                    rest = tail;
                }
                _ => {
                    self.partial.extend_from_slice(rest);
                    rest = &[];
                }
            }
        }

        if !rest.is_empty() {
            trace!(
                "ignoring {} signal data bytes after the last record",
                rest.len()
            );
        }
        Ok(())
    }
}
