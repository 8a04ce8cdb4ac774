use crate::{
    Error, Result,
    blocks::common::{BLOCK_HEADER_SIZE, BlockHeader, validate_buffer_size},
};

/// TXBLOCK or MDBLOCK: a NUL-terminated string.
///
/// Names, units and comments may point at either kind; for an MD block the
/// XML text is returned verbatim.
#[derive(Debug)]
pub struct TextBlock {
    pub header: BlockHeader,
    pub text: String,
}

impl TextBlock {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = BlockHeader::from_bytes(bytes)?;
        if &header.id != b"##TX" && &header.id != b"##MD" {
            return Err(Error::BlockIDError {
                actual: header.id_str(),
                expected: "##TX or ##MD".into(),
            });
        }

        let end = BLOCK_HEADER_SIZE + header.data_length() as usize;
        validate_buffer_size(bytes, end)?;
        let text = String::from_utf8_lossy(&bytes[BLOCK_HEADER_SIZE..end])
            .trim_matches('\0')
            .to_string();

        Ok(Self { header, text })
    }
}
