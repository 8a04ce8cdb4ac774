#![forbid(unsafe_code)]

//! # mdf4-signals
//!
//! A Rust library for extracting signal samples from ASAM MDF 4 (Measurement
//! Data Format) files.
//!
//! Given a channel, the library walks the block graph that holds its data
//! (plain `DT`/`DV` blocks, `DL` data lists, `HL` header lists and zlib
//! compressed `DZ` blocks), slices every record at the channel's byte and bit
//! position and returns one typed [`DecodedValue`] per record.
//!
//! ## Features
//!
//! - **Block traversal**: data lists, header lists and compressed blocks at
//!   any nesting, with cycle and depth guards
//! - **Bit-exact decoding**: integers of any bit width and offset, floats,
//!   Latin-1/UTF-8/UTF-16 strings and byte arrays in both byte orders
//! - **Variable-length signals**: VLSD channels backed by `SD` blocks
//! - **Conversions**: linear, rational and value-to-text
//! - **Invalidation bits**: per-sample validity flags
//! - **Unsorted data groups**: records demultiplexed by record ID
//! - **Caching**: decoded samples and raw fragments are memoized, safely
//!   shared between threads
//!
//! ## Quick Start
//!
//! ```no_run
//! use mdf4_signals::{Mdf, Result};
//!
//! fn main() -> Result<()> {
//!     let mdf = Mdf::open("recording.mf4")?;
//!
//!     for name in mdf.channel_names() {
//!         let samples = mdf.sample(name)?;
//!         println!("{name}: {} samples", samples.len());
//!     }
//!
//!     let speed = mdf.sample("VehicleSpeed")?;
//!     if let Some(time) = mdf.master_sample("VehicleSpeed")? {
//!         for (t, v) in time.iter().zip(speed.iter()) {
//!             println!("{t}: {v}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Memory-optimized reads
//!
//! ```no_run
//! use mdf4_signals::{Mdf, ReadOptions, Result};
//!
//! fn main() -> Result<()> {
//!     let mdf = Mdf::open_with("recording.mf4", ReadOptions::memory_optimized())?;
//!     let raw = mdf.raw_sample("EngineTemp")?;
//!     let valid = mdf.validity("EngineTemp")?;
//!     let good = raw.iter().zip(&valid).filter(|(_, ok)| **ok).count();
//!     println!("{good} of {} samples valid", raw.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`blocks`] | On-disk MDF block structures (for advanced use) |
//! | [`parsing`] | Block dispatcher, record readers and the bit decoder |
//! | [`source`] | Random-access byte sources |
//! | [`extractor`] | Sample extraction over a byte source |
//! | [`directory`] | Serializable channel listing |
//! | [`error`] | Error types and [`Result`] alias |
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`], which is an alias for
//! `std::result::Result<T, Error>`. Any error aborts the extraction of the
//! channel it occurred in; no partial sample arrays are returned.

pub mod blocks;
pub mod parsing;

mod channel;
mod channel_group;
mod data_group;
mod mdf;

pub mod directory;
pub mod error;
pub mod extractor;
pub mod source;
pub mod types;

// Re-export commonly used types at the crate root
pub use blocks::{Conversion, DataType};
pub use channel::{Channel, ChannelType, Samples, ValidityRule};
pub use channel_group::ChannelGroup;
pub use data_group::{DataGroup, Fragments, RecordLayout, RecordSize};
pub use directory::{ChannelEntry, Directory, GroupEntry};
pub use error::{Error, Result};
pub use extractor::{Extractor, ReadOptions};
pub use mdf::Mdf;
pub use source::{ByteSource, FileSource, MemorySource};
pub use types::DecodedValue;
