use super::types::ConversionType;
use crate::Result;
use crate::blocks::common::{
    BlockHeader, BlockParse, read_f64, read_u8, read_u16, read_u64, validate_buffer_size,
};

/// Raw CCBLOCK as stored on disk.
///
/// Link targets are left unresolved; [`super::Conversion::from_block`] turns
/// this into an applicable formula.
#[derive(Debug, Clone)]
pub struct ConversionBlock {
    pub header: BlockHeader,

    // Link section
    pub name_addr: Option<u64>,
    pub unit_addr: Option<u64>,
    pub comment_addr: Option<u64>,
    pub inverse_addr: Option<u64>,
    pub refs: Vec<u64>,

    // Data
    pub conversion_type: ConversionType,
    pub precision: u8,
    pub flags: u16,
    pub ref_count: u16,
    pub value_count: u16,
    pub phys_range_min: Option<f64>,
    pub phys_range_max: Option<f64>,
    pub values: Vec<f64>,
}

const FIXED_LINKS: usize = 4;

fn optional_link(link: u64) -> Option<u64> {
    if link == 0 { None } else { Some(link) }
}

impl BlockParse<'_> for ConversionBlock {
    const ID: &'static [u8; 4] = b"##CC";

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = Self::parse_header(bytes)?;

        let link_count = usize::try_from(header.link_count)
            .unwrap_or(usize::MAX)
            .max(FIXED_LINKS);
        let links_end = 24usize.saturating_add(link_count.saturating_mul(8));
        validate_buffer_size(bytes, links_end.saturating_add(8))?;

        let refs = (FIXED_LINKS..link_count)
            .map(|i| read_u64(bytes, 24 + i * 8))
            .collect();

        let mut offset = links_end;
        let conversion_type = ConversionType::from_u8(read_u8(bytes, offset));
        let precision = read_u8(bytes, offset + 1);
        let flags = read_u16(bytes, offset + 2);
        let ref_count = read_u16(bytes, offset + 4);
        let value_count = read_u16(bytes, offset + 6);
        offset += 8;

        // Some writers emit the physical range even with flags bit 1 clear,
        // so presence is decided by the block length.
        let size_without_range = offset + usize::from(value_count) * 8;
        let has_range = header.length as usize >= size_without_range + 16;

        let (phys_range_min, phys_range_max) = if has_range {
            validate_buffer_size(bytes, offset + 16)?;
            let range = (Some(read_f64(bytes, offset)), Some(read_f64(bytes, offset + 8)));
            offset += 16;
            range
        } else {
            (None, None)
        };

        validate_buffer_size(bytes, offset + usize::from(value_count) * 8)?;
        let values = (0..usize::from(value_count))
            .map(|i| read_f64(bytes, offset + i * 8))
            .collect();

        Ok(Self {
            name_addr: optional_link(read_u64(bytes, 24)),
            unit_addr: optional_link(read_u64(bytes, 32)),
            comment_addr: optional_link(read_u64(bytes, 40)),
            inverse_addr: optional_link(read_u64(bytes, 48)),
            header,
            refs,
            conversion_type,
            precision,
            flags,
            ref_count,
            value_count,
            phys_range_min,
            phys_range_max,
            values,
        })
    }
}

#[cfg(test)]
pub(crate) fn cc_bytes(cc_type: u8, refs: &[u64], values: &[f64]) -> Vec<u8> {
    let link_count = (FIXED_LINKS + refs.len()) as u64;
    let length = 24 + link_count * 8 + 8 + values.len() as u64 * 8;
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"##CC");
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&length.to_le_bytes());
    bytes.extend_from_slice(&link_count.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 32]);
    for r in refs {
        bytes.extend_from_slice(&r.to_le_bytes());
    }
    bytes.push(cc_type);
    bytes.push(0);
    bytes.extend_from_slice(&0u16.to_le_bytes());
    bytes.extend_from_slice(&(refs.len() as u16).to_le_bytes());
    bytes.extend_from_slice(&(values.len() as u16).to_le_bytes());
    for v in values {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}
