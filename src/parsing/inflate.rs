//! Decompression of DZ payloads.

use crate::blocks::{DzBlock, DzCompressionType};
use crate::{Error, Result};

/// Inflate a DZ block into the raw bytes of the block it stands for.
///
/// Transposed payloads are restored to record order afterwards. The result
/// must be exactly `original_data_length` bytes long.
#[cfg(feature = "compression")]
pub fn inflate(dz: &DzBlock<'_>) -> Result<Vec<u8>> {
    use miniz_oxide::inflate::decompress_to_vec_zlib;

    let inflated = decompress_to_vec_zlib(dz.data)
        .map_err(|e| Error::Decompression(format!("zlib stream: {e:?}")))?;

    if inflated.len() as u64 != dz.original_data_length {
        return Err(Error::Decompression(format!(
            "inflated {} bytes, block declares {}",
            inflated.len(),
            dz.original_data_length
        )));
    }

    match dz.zip_type {
        DzCompressionType::Deflate => Ok(inflated),
        DzCompressionType::TranspositionDeflate => {
            untranspose(&inflated, dz.zip_parameter as usize)
        }
    }
}

#[cfg(not(feature = "compression"))]
pub fn inflate(_dz: &DzBlock<'_>) -> Result<Vec<u8>> {
    Err(Error::CompressionUnavailable)
}

/// Undo a byte transposition with `columns` columns.
///
/// The writer stores the first `rows * columns` bytes column by column
/// (`rows = len / columns`); bytes past that are left in place.
pub fn untranspose(data: &[u8], columns: usize) -> Result<Vec<u8>> {
    if columns == 0 {
        return Err(Error::Decompression(
            "transposition with zero columns".into(),
        ));
    }
    let rows = data.len() / columns;
    let body = rows * columns;

    let mut out = vec![0u8; data.len()];
    for r in 0..rows {
        for c in 0..columns {
            out[r * columns + c] = data[c * rows + r];
        }
    }
    out[body..].copy_from_slice(&data[body..]);
    Ok(out)
}
