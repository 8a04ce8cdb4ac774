use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::{Error, Result};

/// Raw payload fragments of a data group, in stream order.
pub type Fragments = Arc<[Vec<u8>]>;

/// Records of an unsorted data group split by record ID. Each record keeps
/// its ID prefix.
pub type RecordStreams = Arc<HashMap<u64, Vec<u8>>>;

/// Size of the records one record ID stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSize {
    /// Data and invalidation bytes after the record ID.
    Fixed(usize),
    /// A `u32` length followed by that many bytes (VLSD channel group).
    Variable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    pub record_id: u64,
    pub size: RecordSize,
}

/// Owner of one block graph and of the caches shared by all channels that
/// read it: raw fragments for sorted groups, record streams for unsorted
/// ones.
#[derive(Debug)]
pub struct DataGroup {
    /// Start of the block graph, 0 when the group has no data.
    pub data_address: u64,
    pub record_id_size: u8,
    /// One entry per channel group; used to split unsorted record streams.
    pub record_layouts: Vec<RecordLayout>,
    cache: Mutex<Option<Fragments>>,
    streams: Mutex<Option<RecordStreams>>,
}

impl DataGroup {
    pub fn new(data_address: u64, record_id_size: u8) -> Self {
        Self {
            data_address,
            record_id_size,
            record_layouts: Vec::new(),
            cache: Mutex::new(None),
            streams: Mutex::new(None),
        }
    }

    pub fn with_record_layout(mut self, record_id: u64, size: RecordSize) -> Self {
        self.record_layouts.push(RecordLayout { record_id, size });
        self
    }

    /// True when records of several channel groups are interleaved.
    pub fn is_unsorted(&self) -> bool {
        self.record_id_size > 0 && self.record_layouts.len() > 1
    }

    /// True once the fragment or record stream cache is populated.
    pub fn is_cached(&self) -> bool {
        let fragments = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let streams = self.streams.lock().unwrap_or_else(PoisonError::into_inner);
        fragments.is_some() || streams.is_some()
    }

    /// Return the cached fragments, loading them first if needed.
    ///
    /// The lock is held while `load` runs, so concurrent callers wait for the
    /// first load instead of repeating it. A failed load leaves the cache
    /// empty.
    pub(crate) fn fragments_or_load<F>(&self, load: F) -> Result<Fragments>
    where
        F: FnOnce() -> Result<Vec<Vec<u8>>>,
    {
        let mut slot = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(fragments) = slot.as_ref() {
            return Ok(Arc::clone(fragments));
        }
        let fragments: Fragments = load()?.into();
        *slot = Some(Arc::clone(&fragments));
        Ok(fragments)
    }

    /// Return the cached record streams, splitting them with `load` first if
    /// needed. Same locking rules as [`DataGroup::fragments_or_load`].
    pub(crate) fn streams_or_load<F>(&self, load: F) -> Result<RecordStreams>
    where
        F: FnOnce() -> Result<HashMap<u64, Vec<u8>>>,
    {
        let mut slot = self.streams.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(streams) = slot.as_ref() {
            return Ok(Arc::clone(streams));
        }
        let streams = Arc::new(load()?);
        *slot = Some(Arc::clone(&streams));
        Ok(streams)
    }

    fn read_record_id(&self, stream: &[u8], offset: usize) -> Option<u64> {
        let size = usize::from(self.record_id_size);
        let bytes = stream.get(offset..offset + size)?;
        let mut buf = [0u8; 8];
        buf[..size.min(8)].copy_from_slice(&bytes[..size.min(8)]);
        Some(u64::from_le_bytes(buf))
    }

    /// Split an unsorted stream by record ID in one pass.
    ///
    /// Every record keeps its ID prefix, so each channel group's record
    /// stride applies unchanged. A trailing partial record is dropped.
    pub fn split_records(&self, stream: &[u8]) -> Result<HashMap<u64, Vec<u8>>> {
        let id_size = usize::from(self.record_id_size);
        let mut streams: HashMap<u64, Vec<u8>> = HashMap::new();
        let mut offset = 0;

        while offset < stream.len() {
            let Some(id) = self.read_record_id(stream, offset) else {
                break;
            };
            let layout = self
                .record_layouts
                .iter()
                .find(|l| l.record_id == id)
                .ok_or(Error::UnknownRecordId {
                    record_id: id,
                    offset,
                })?;

            let record_len = match layout.size {
                RecordSize::Fixed(size) => id_size + size,
                RecordSize::Variable => {
                    let len_at = offset + id_size;
                    let Some(prefix) = stream.get(len_at..len_at + 4) else {
                        break;
                    };
                    let len = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);
                    id_size + 4 + len as usize
                }
            };
            let end = offset.saturating_add(record_len);
            if end > stream.len() {
                break;
            }
            streams
                .entry(id)
                .or_default()
                .extend_from_slice(&stream[offset..end]);
            offset = end;
        }
        Ok(streams)
    }

    /// Records of `record_id` from an unsorted stream.
    pub fn demultiplex(&self, stream: &[u8], record_id: u64) -> Result<Vec<u8>> {
        Ok(self
            .split_records(stream)?
            .remove(&record_id)
            .unwrap_or_default())
    }
}
