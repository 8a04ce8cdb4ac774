use super::ID_BLOCK_SIZE;
use crate::{
    Error, Result,
    blocks::common::{read_u16, validate_buffer_size},
};

/// Lowest `id_ver` number this library reads.
pub const MIN_VERSION: u16 = 400;

/// Identification Block - file format identifier at the start of every MDF file.
///
/// Always located at file offset 0. Unlike all other blocks it has no
/// common block header.
#[derive(Debug, Clone)]
pub struct IdentificationBlock {
    /// File identifier string ("MDF     ").
    pub file_id: String,
    /// Format version string (e.g., "4.10    ").
    pub format_version: String,
    /// Program identifier string (tool that created the file).
    pub program_id: String,
    /// Numeric version (e.g., 410 for version 4.10).
    pub version_number: u16,
    pub unfinalized_flags: u16,
    pub custom_flags: u16,
}

fn fixed_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

impl IdentificationBlock {
    /// Parses and validates an identification block from a 64 byte slice.
    ///
    /// Files still marked unfinalized ("UnFinMF ") are rejected with
    /// [`Error::FileIdentifierError`], versions older than 4.00 with
    /// [`Error::FileVersioningError`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        validate_buffer_size(bytes, ID_BLOCK_SIZE)?;

        let file_id = fixed_text(&bytes[0..8]);
        if file_id != "MDF     " {
            return Err(Error::FileIdentifierError(file_id));
        }

        let version_number = read_u16(bytes, 28);
        if version_number < MIN_VERSION {
            return Err(Error::FileVersioningError(version_number));
        }

        Ok(Self {
            file_id,
            format_version: fixed_text(&bytes[8..16]),
            program_id: fixed_text(&bytes[16..24]),
            version_number,
            unfinalized_flags: read_u16(bytes, 60),
            custom_flags: read_u16(bytes, 62),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_bytes(file_id: &[u8; 8], version: u16) -> Vec<u8> {
        let mut bytes = vec![0u8; ID_BLOCK_SIZE];
        bytes[0..8].copy_from_slice(file_id);
        bytes[8..16].copy_from_slice(b"4.10    ");
        bytes[16..24].copy_from_slice(b"signals ");
        bytes[28..30].copy_from_slice(&version.to_le_bytes());
        bytes
    }

    #[test]
    fn accepts_finalized_v4() {
        let id = IdentificationBlock::from_bytes(&id_bytes(b"MDF     ", 410)).unwrap();
        assert_eq!(id.version_number, 410);
        assert_eq!(id.format_version.trim(), "4.10");
    }

    #[test]
    fn rejects_foreign_and_unfinalized_files() {
        assert!(matches!(
            IdentificationBlock::from_bytes(&id_bytes(b"UnFinMF ", 410)),
            Err(Error::FileIdentifierError(_))
        ));
        assert!(matches!(
            IdentificationBlock::from_bytes(&id_bytes(b"PK\x03\x04    ", 410)),
            Err(Error::FileIdentifierError(_))
        ));
    }

    #[test]
    fn rejects_mdf3() {
        assert!(matches!(
            IdentificationBlock::from_bytes(&id_bytes(b"MDF     ", 330)),
            Err(Error::FileVersioningError(330))
        ));
    }
}
