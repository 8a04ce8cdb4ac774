//! Error types for MDF4 signal extraction.
//!
//! This module defines the [`Error`] enum which represents every failure the
//! extraction engine and the container bootstrap can report.
//!
//! # Example
//!
//! ```no_run
//! use mdf4_signals::{Mdf, Error, Result};
//!
//! fn print_channel(path: &str, name: &str) -> Result<()> {
//!     let mdf = Mdf::open(path)?;
//!     match mdf.sample(name) {
//!         Ok(samples) => {
//!             println!("{name}: {} samples", samples.len());
//!             Ok(())
//!         }
//!         Err(Error::ChannelNotFound(missing)) => {
//!             eprintln!("no channel called {missing}");
//!             Ok(())
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! ```

use core::fmt;

/// Errors that can occur while reading an MDF file or extracting samples.
///
/// Every error aborts the extraction of the channel it occurred in; no
/// partial sample arrays are returned.
#[derive(Debug)]
pub enum Error {
    /// An I/O error occurred while reading the underlying file.
    IOError(std::io::Error),

    /// The byte source could not supply the requested range.
    Truncated {
        /// Absolute offset of the read
        offset: u64,
        /// Number of bytes requested
        requested: u64,
        /// Number of bytes the source holds past `offset`
        available: u64,
    },

    /// Buffer provided for parsing was too small.
    ///
    /// This typically indicates file corruption or an incomplete block.
    TooShortBuffer {
        /// Actual number of bytes available
        actual: usize,
        /// Minimum number of bytes required
        expected: usize,
        /// Source file where the error was detected
        file: &'static str,
        /// Line number where the error was detected
        line: u32,
    },

    /// A block parser was pointed at a block of a different kind.
    BlockIDError {
        /// The identifier that was found
        actual: String,
        /// The identifier that was expected
        expected: String,
    },

    /// A block tag the dispatcher cannot handle in the current context.
    UnsupportedBlockKind {
        /// Raw 4-byte tag as found in the file
        tag: [u8; 4],
        /// Where the tag was met
        context: &'static str,
    },

    /// The decoded byte window is narrower than the target type.
    InsufficientData {
        /// Bytes (or bits, for bit windows) the target type needs
        required: usize,
        /// Bytes available in the window
        actual: usize,
        /// Name of the target type
        kind: &'static str,
    },

    /// The declared data type and width have no decoding rule.
    UnsupportedType {
        /// Declared data type
        data_type: String,
        /// Declared bit count
        bit_count: u32,
    },

    /// The channel layout does not fit into the record of its group.
    InvalidLayout(String),

    /// No channel with the given name exists in the file.
    ChannelNotFound(String),

    /// The file identifier is not "MDF     ".
    FileIdentifierError(String),

    /// The MDF version is older than 4.00.
    FileVersioningError(u16),

    /// A zlib stream could not be inflated or inflated to the wrong size.
    Decompression(String),

    /// A compressed block was found but the `compression` feature is disabled.
    CompressionUnavailable,

    /// The block graph ended before the group's cycle count was reached.
    RecordCountMismatch {
        /// Cycle count declared by the channel group
        expected: u64,
        /// Records actually decoded
        actual: u64,
    },

    /// An unsorted data group contains a record ID no channel group declares.
    UnknownRecordId {
        /// The record ID that was read
        record_id: u64,
        /// Offset of the record in the group's record stream
        offset: usize,
    },

    /// A block chain links back to a block that was already visited.
    BlockChainCycle {
        /// The address where the cycle was detected
        address: u64,
    },

    /// Block indirections nest deeper than the configured maximum.
    BlockChainTooDeep {
        /// The maximum depth that was exceeded
        max_depth: usize,
    },

    /// Serializing or deserializing the channel directory failed.
    Serialization(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IOError(e) => write!(f, "I/O error: {e}"),
            Error::Truncated {
                offset,
                requested,
                available,
            } => write!(
                f,
                "Truncated read at {offset:#x}: requested {requested} bytes, {available} available"
            ),
            Error::TooShortBuffer {
                actual,
                expected,
                file,
                line,
            } => write!(
                f,
                "Buffer too small at {file}:{line}: need at least {expected} bytes, got {actual}"
            ),
            Error::BlockIDError { actual, expected } => {
                write!(
                    f,
                    "Invalid block identifier: Expected {expected:?}, got {actual:?}"
                )
            }
            Error::UnsupportedBlockKind { tag, context } => write!(
                f,
                "Unsupported block kind {:?} ({context})",
                String::from_utf8_lossy(tag)
            ),
            Error::InsufficientData {
                required,
                actual,
                kind,
            } => write!(
                f,
                "Not enough data to read {kind}: need {required} bytes, got {actual}"
            ),
            Error::UnsupportedType {
                data_type,
                bit_count,
            } => write!(f, "Unsupported data type: {data_type} with {bit_count} bits"),
            Error::InvalidLayout(s) => write!(f, "Invalid channel layout: {s}"),
            Error::ChannelNotFound(name) => write!(f, "Channel not found: {name}"),
            Error::FileIdentifierError(id) => {
                write!(
                    f,
                    r#"Invalid file identifier: Expected "MDF     ", found {id:?}"#
                )
            }
            Error::FileVersioningError(ver) => {
                write!(f, "File version too low: Expected >= 400, found {ver}")
            }
            Error::Decompression(s) => write!(f, "Decompression failed: {s}"),
            Error::CompressionUnavailable => write!(
                f,
                "Compressed block found but the `compression` feature is disabled"
            ),
            Error::RecordCountMismatch { expected, actual } => write!(
                f,
                "Record count mismatch: cycle count is {expected}, decoded {actual}"
            ),
            Error::UnknownRecordId { record_id, offset } => write!(
                f,
                "Unknown record ID {record_id} at stream offset {offset}"
            ),
            Error::BlockChainCycle { address } => {
                write!(f, "Block chain cycle detected at block address {address:#x}")
            }
            Error::BlockChainTooDeep { max_depth } => write!(
                f,
                "Block chain too deep: maximum depth of {max_depth} exceeded"
            ),
            Error::Serialization(s) => write!(f, "Serialization error: {s}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IOError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IOError(err)
    }
}

/// A specialized Result type for MDF operations.
///
/// This is defined as `core::result::Result<T, Error>` for convenience.
pub type Result<T> = core::result::Result<T, Error>;
