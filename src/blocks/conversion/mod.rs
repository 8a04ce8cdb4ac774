//! Channel conversions (CCBLOCK).
//!
//! [`ConversionBlock`] is the raw block; [`Conversion`] is the resolved
//! formula applied element-wise to raw samples.

mod base;
mod linear;
mod text;
mod types;

pub use base::ConversionBlock;
pub use text::ValueToText;
pub use types::ConversionType;

#[cfg(test)]
pub(crate) use base::cc_bytes;

use crate::types::DecodedValue;
use crate::{Error, Result};

/// A conversion rule from raw to physical values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Conversion {
    Identity,
    /// `offset + factor * x`
    Linear { offset: f64, factor: f64 },
    /// `(p1·x² + p2·x + p3) / (p4·x² + p5·x + p6)`
    Rational { p: [f64; 6] },
    ValueToText(ValueToText),
    /// A `cc_type` this library does not evaluate. Applied as identity.
    Unsupported(u8),
}

impl Conversion {
    /// Build a conversion from a parsed CC block.
    ///
    /// `resolve_text` maps a reference link to its text when the link points
    /// at a TX block and returns `None` for anything else.
    pub fn from_block<F>(block: &ConversionBlock, mut resolve_text: F) -> Result<Self>
    where
        F: FnMut(u64) -> Result<Option<String>>,
    {
        let conversion = match block.conversion_type {
            ConversionType::Identity => Conversion::Identity,
            ConversionType::Linear => match block.values.as_slice() {
                [offset, factor, ..] => Conversion::Linear {
                    offset: *offset,
                    factor: *factor,
                },
                _ => return Err(too_few_values(block, 2)),
            },
            ConversionType::Rational => match block.values.as_slice() {
                [a, b, c, d, e, f, ..] => Conversion::Rational {
                    p: [*a, *b, *c, *d, *e, *f],
                },
                _ => return Err(too_few_values(block, 6)),
            },
            ConversionType::ValueToText => {
                let keys = block.values.clone();
                let mut texts = Vec::with_capacity(keys.len());
                for idx in 0..keys.len() {
                    let text = match block.refs.get(idx) {
                        Some(&link) if link != 0 => resolve_text(link)?,
                        _ => None,
                    };
                    texts.push(text);
                }
                let default = match block.refs.get(keys.len()) {
                    Some(&link) if link != 0 => resolve_text(link)?,
                    _ => None,
                };
                Conversion::ValueToText(ValueToText {
                    keys,
                    texts,
                    default,
                })
            }
            other => Conversion::Unsupported(other.to_u8()),
        };
        Ok(conversion)
    }

    /// Convert one raw value.
    pub fn apply(&self, value: &DecodedValue) -> DecodedValue {
        match self {
            Conversion::Identity | Conversion::Unsupported(_) => value.clone(),
            Conversion::Linear { offset, factor } => linear::apply_linear(*offset, *factor, value),
            Conversion::Rational { p } => linear::apply_rational(p, value),
            Conversion::ValueToText(table) => table.apply(value),
        }
    }

    /// True when [`Conversion::apply`] never changes a value.
    pub fn is_identity(&self) -> bool {
        matches!(self, Conversion::Identity | Conversion::Unsupported(_))
    }
}

fn too_few_values(block: &ConversionBlock, needed: usize) -> Error {
    Error::InvalidLayout(format!(
        "{:?} conversion needs {needed} parameters, block has {}",
        block.conversion_type,
        block.values.len()
    ))
}
