//! Random-access byte sources.
//!
//! Every read names its absolute offset, so a source has no cursor and a
//! shared `&S` can serve several extractions at once.

use std::fs::File;
use std::path::Path;

use crate::blocks::{BLOCK_HEADER_SIZE, BlockHeader};
use crate::{Error, Result};

/// Trait for reading byte ranges at absolute offsets.
pub trait ByteSource {
    /// Total number of bytes in the source.
    fn len(&self) -> u64;

    /// Fill `buf` with the bytes starting at `offset`.
    ///
    /// Fails with [`Error::Truncated`] when the range extends past the end.
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<()>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read `length` bytes starting at `offset`.
    ///
    /// The range is checked before the buffer is allocated, so a corrupt
    /// length fails with [`Error::Truncated`].
    fn read_at(&self, offset: u64, length: usize) -> Result<Vec<u8>> {
        check_range(offset, length, self.len())?;
        let mut buf = vec![0u8; length];
        self.read_exact_at(offset, &mut buf)?;
        Ok(buf)
    }

    /// Read the 24-byte block header at `address`.
    fn read_header(&self, address: u64) -> Result<BlockHeader> {
        let mut buf = [0u8; BLOCK_HEADER_SIZE];
        self.read_exact_at(address, &mut buf)?;
        BlockHeader::from_bytes(&buf)
    }

    /// Read the whole block at `address`, header included.
    fn read_block(&self, address: u64) -> Result<Vec<u8>> {
        let header = self.read_header(address)?;
        if header.length < BLOCK_HEADER_SIZE as u64 {
            return Err(Error::InvalidLayout(format!(
                "block {} at {address:#x} declares length {}",
                header.id_str(),
                header.length
            )));
        }
        let length = crate::blocks::u64_to_usize(header.length, "block length")?;
        self.read_at(address, length)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &S {
    fn len(&self) -> u64 {
        (**self).len()
    }

    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        (**self).read_exact_at(offset, buf)
    }
}

fn check_range(offset: u64, requested: usize, total: u64) -> Result<()> {
    let requested = requested as u64;
    match offset.checked_add(requested) {
        Some(end) if end <= total => Ok(()),
        _ => Err(Error::Truncated {
            offset,
            requested,
            available: total.saturating_sub(offset),
        }),
    }
}

/// Local file source using positioned reads.
#[derive(Debug)]
pub struct FileSource {
    file: File,
    len: u64,
}

impl FileSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(file)
    }

    pub fn new(file: File) -> Result<Self> {
        let len = file.metadata()?.len();
        Ok(Self { file, len })
    }
}

impl ByteSource for FileSource {
    fn len(&self) -> u64 {
        self.len
    }

    #[cfg(unix)]
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        use std::os::unix::fs::FileExt;
        check_range(offset, buf.len(), self.len)?;
        self.file.read_exact_at(buf, offset)?;
        Ok(())
    }

    #[cfg(windows)]
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        use std::os::windows::fs::FileExt;
        check_range(offset, buf.len(), self.len)?;
        let mut filled = 0;
        while filled < buf.len() {
            let n = self
                .file
                .seek_read(&mut buf[filled..], offset + filled as u64)?;
            if n == 0 {
                return Err(Error::Truncated {
                    offset,
                    requested: buf.len() as u64,
                    available: filled as u64,
                });
            }
            filled += n;
        }
        Ok(())
    }
}

/// In-memory source, mostly for tests and for files already loaded.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    bytes: Vec<u8>,
}

impl MemorySource {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<Vec<u8>> for MemorySource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl ByteSource for MemorySource {
    fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        check_range(offset, buf.len(), self.len())?;
        let start = offset as usize;
        buf.copy_from_slice(&self.bytes[start..start + buf.len()]);
        Ok(())
    }
}
