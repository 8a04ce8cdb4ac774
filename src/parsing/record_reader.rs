//! Fixed-length record reading.
//!
//! A channel group's records form one byte stream that the block graph may
//! cut at arbitrary points. [`RecordReader`] consumes the stream fragment by
//! fragment and decodes one field per record.

use crate::parsing::decoder::FieldLayout;
use crate::parsing::dispatcher::FragmentSink;
use crate::types::DecodedValue;
use crate::{Error, Result};

/// Upper bound for the initial sample allocation.
const MAX_PREALLOCATED: u64 = 1 << 20;

/// Offset of the next record start in the buffer that follows a buffer of
/// `len` bytes whose first record started at `start`.
///
/// Zero when the buffer ends on a record boundary.
#[inline]
pub fn carry_offset(start: usize, len: usize, stride: usize) -> usize {
    (start + (stride - len % stride)) % stride
}

/// A field whose bytes continue in a later fragment.
#[derive(Debug)]
struct PendingField {
    /// Bytes to skip at the start of the next fragment before the field begins.
    skip: usize,
    bytes: Vec<u8>,
}

#[derive(Debug)]
pub struct RecordReader {
    field: FieldLayout,
    stride: usize,
    expected: u64,
    remaining: u64,
    /// Offset of the next unclaimed record in the next fragment.
    start: usize,
    pending: Option<PendingField>,
    values: Vec<DecodedValue>,
}

impl RecordReader {
    /// Read `cycle_count` records of `stride` bytes.
    pub fn new(field: FieldLayout, stride: usize, cycle_count: u64) -> Result<Self> {
        if stride == 0 {
            return Err(Error::InvalidLayout("record stride is zero".into()));
        }
        if field.end() > stride {
            return Err(Error::InvalidLayout(format!(
                "field at byte {} spanning {} bytes exceeds record stride {stride}",
                field.byte_offset, field.span
            )));
        }
        Ok(Self {
            field,
            stride,
            expected: cycle_count,
            remaining: cycle_count,
            start: 0,
            pending: None,
            values: Vec::with_capacity(cycle_count.min(MAX_PREALLOCATED) as usize),
        })
    }

    /// Number of records claimed so far.
    pub fn records_seen(&self) -> u64 {
        self.expected - self.remaining
    }

    fn complete_pending(&mut self, fragment: &[u8]) -> Result<()> {
        let Some(pending) = self.pending.as_mut() else {
            return Ok(());
        };
        let skip = pending.skip.min(fragment.len());
        pending.skip -= skip;
        let take = (self.field.span - pending.bytes.len()).min(fragment.len() - skip);
        pending
            .bytes
            .extend_from_slice(&fragment[skip..skip + take]);

        if pending.bytes.len() == self.field.span {
            let value = self.field.decode(&pending.bytes)?;
            self.values.push(value);
            self.pending = None;
        }
        Ok(())
    }

    /// Validate the record count and return the decoded values.
    pub fn finish(self) -> Result<Vec<DecodedValue>> {
        if self.remaining > 0 || self.pending.is_some() {
            return Err(Error::RecordCountMismatch {
                expected: self.expected,
                actual: self.values.len() as u64,
            });
        }
        Ok(self.values)
    }
}

impl FragmentSink for RecordReader {
    fn accept(&mut self, fragment: &[u8]) -> Result<()> {
        let len = fragment.len();
        if len == 0 {
            return Ok(());
        }
        self.complete_pending(fragment)?;

        let mut start = self.start;
        while start < len && self.remaining > 0 {
            self.remaining -= 1;
            let field_start = start + self.field.byte_offset;
            let field_end = field_start + self.field.span;

            if field_end <= len {
                let value = self.field.decode(&fragment[field_start..field_end])?;
                self.values.push(value);
            } else if field_start < len {
                self.pending = Some(PendingField {
                    skip: 0,
                    bytes: fragment[field_start..].to_vec(),
                });
            } else {
                self.pending = Some(PendingField {
                    skip: field_start - len,
                    bytes: Vec::with_capacity(self.field.span),
                });
            }
            start += self.stride;
        }

        self.start = carry_offset(self.start, len, self.stride);
        Ok(())
    }
}
