//! The extraction engine: block traversal, record slicing and value
//! decoding, plus the metadata bootstrap.

pub mod chain;
pub mod decoder;
pub mod dispatcher;
pub mod inflate;
pub mod record_reader;
pub mod vlsd_reader;

mod bootstrap;

pub(crate) use bootstrap::{Container, read_container};
