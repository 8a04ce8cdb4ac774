use crate::{
    Error, Result,
    blocks::common::{
        BLOCK_HEADER_SIZE, BlockHeader, BlockParse, read_u32, read_u64, validate_buffer_size,
    },
};

/// DLBLOCK: Data List Block (ordered list of data blocks).
///
/// The first link is `next`, pointing at the successor list node when one
/// node cannot hold every child. The remaining links address the children
/// (DT/DV/DZ/SD) in stream order.
#[derive(Debug, Clone)]
pub struct DataListBlock {
    pub header: BlockHeader,
    pub next: u64,
    pub data_links: Vec<u64>,
    pub flags: u8,
    pub data_block_nr: u32,
    /// Common block length when `flags` bit 0 is set.
    pub data_block_len: Option<u64>,
    /// Per-child stream offsets otherwise.
    pub offsets: Option<Vec<u64>>,
}

impl BlockParse<'_> for DataListBlock {
    const ID: &'static [u8; 4] = b"##DL";

    /// Parse a DLBLOCK from raw bytes.
    ///
    /// The link table and the offset table are sized from file values, so
    /// both are checked against the buffer before anything is read.
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = Self::parse_header(bytes)?;
        if header.link_count == 0 {
            return Err(Error::InvalidLayout(
                "data list block without a next link".into(),
            ));
        }

        // an unrepresentable size can never fit, so it fails the size check
        let link_count = usize::try_from(header.link_count).unwrap_or(usize::MAX);
        let links_end = link_count
            .checked_mul(8)
            .and_then(|links| links.checked_add(BLOCK_HEADER_SIZE))
            .unwrap_or(usize::MAX);
        validate_buffer_size(bytes, links_end.saturating_add(8))?;

        let next = read_u64(bytes, 24);
        let data_links = (1..link_count)
            .map(|i| read_u64(bytes, 24 + i * 8))
            .collect();

        let mut off = links_end;
        let flags = bytes[off];
        off += 4; // flags + 3 reserved
        let data_block_nr = read_u32(bytes, off);
        off += 4;

        let (data_block_len, offsets) = if flags & 1 != 0 {
            validate_buffer_size(bytes, off + 8)?;
            (Some(read_u64(bytes, off)), None)
        } else {
            let count = data_block_nr as usize;
            let table_end = count
                .checked_mul(8)
                .and_then(|table| table.checked_add(off))
                .unwrap_or(usize::MAX);
            validate_buffer_size(bytes, table_end)?;
            let offs = (0..count).map(|i| read_u64(bytes, off + i * 8)).collect();
            (None, Some(offs))
        };

        Ok(DataListBlock {
            header,
            next,
            data_links,
            flags,
            data_block_nr,
            data_block_len,
            offsets,
        })
    }
}

impl DataListBlock {
    /// Child links that are not null.
    pub fn children(&self) -> impl Iterator<Item = u64> + '_ {
        self.data_links.iter().copied().filter(|&link| link != 0)
    }
}
