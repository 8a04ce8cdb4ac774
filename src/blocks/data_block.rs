use crate::{
    Error, Result,
    blocks::common::{BLOCK_HEADER_SIZE, BlockHeader, BlockKind, validate_buffer_size},
};

/// DTBLOCK / DVBLOCK: fixed-stride record data.
///
/// Both tags share the same on-disk layout: a header followed by
/// `length - 24` bytes of back-to-back records. Records may continue in the
/// next block of a list, so the payload is handed out whole.
#[derive(Debug, Clone)]
pub struct DataBlock<'a> {
    pub header: BlockHeader,
    pub data: &'a [u8],
}

impl<'a> DataBlock<'a> {
    /// Parse a `##DT` or `##DV` block from the given byte slice.
    ///
    /// The slice must contain at least the number of bytes specified by the
    /// block length in the header.
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self> {
        let header = BlockHeader::from_bytes(bytes)?;
        if !header.kind().is_record_data() {
            return Err(Error::BlockIDError {
                actual: header.id_str(),
                expected: "##DT or ##DV".into(),
            });
        }

        let end = payload_end(&header);
        validate_buffer_size(bytes, end)?;
        Ok(Self {
            header,
            data: &bytes[BLOCK_HEADER_SIZE..end],
        })
    }

    #[inline]
    pub fn kind(&self) -> BlockKind {
        self.header.kind()
    }
}

/// End of the payload the header declares, saturating on absurd lengths.
pub(crate) fn payload_end(header: &BlockHeader) -> usize {
    usize::try_from(header.data_length())
        .unwrap_or(usize::MAX)
        .saturating_add(BLOCK_HEADER_SIZE)
}
