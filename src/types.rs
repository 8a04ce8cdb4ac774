//! Shared value types used across the library.

use core::fmt;

/// A decoded channel sample.
///
/// The variant always matches the channel's declared data type and width, so
/// a `uint16` channel yields only [`DecodedValue::UInt16`] values. Conversions
/// that produce physical values yield [`DecodedValue::Float64`] or
/// [`DecodedValue::Text`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecodedValue {
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    /// Text string (UTF-8, or converted from Latin-1/UTF-16)
    Text(String),
    /// Raw byte array
    Bytes(Vec<u8>),
}

impl DecodedValue {
    /// Returns true if this is an integer value (signed or unsigned).
    #[inline]
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DecodedValue::Int8(_)
                | DecodedValue::UInt8(_)
                | DecodedValue::Int16(_)
                | DecodedValue::UInt16(_)
                | DecodedValue::Int32(_)
                | DecodedValue::UInt32(_)
                | DecodedValue::Int64(_)
                | DecodedValue::UInt64(_)
        )
    }

    /// Returns true if this is a floating point value.
    #[inline]
    pub fn is_float(&self) -> bool {
        matches!(self, DecodedValue::Float32(_) | DecodedValue::Float64(_))
    }

    /// Returns true if this is a string value.
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self, DecodedValue::Text(_))
    }

    /// Returns true if this is a byte array value.
    #[inline]
    pub fn is_bytes(&self) -> bool {
        matches!(self, DecodedValue::Bytes(_))
    }

    /// Attempts to convert to f64, useful for numeric operations.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            DecodedValue::Int8(v) => Some(v as f64),
            DecodedValue::UInt8(v) => Some(v as f64),
            DecodedValue::Int16(v) => Some(v as f64),
            DecodedValue::UInt16(v) => Some(v as f64),
            DecodedValue::Int32(v) => Some(v as f64),
            DecodedValue::UInt32(v) => Some(v as f64),
            DecodedValue::Int64(v) => Some(v as f64),
            DecodedValue::UInt64(v) => Some(v as f64),
            DecodedValue::Float32(v) => Some(v as f64),
            DecodedValue::Float64(v) => Some(v),
            DecodedValue::Text(_) | DecodedValue::Bytes(_) => None,
        }
    }

    /// Integer view of the value, if it is an integer that fits in `i128`.
    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            DecodedValue::Int8(v) => Some(v.into()),
            DecodedValue::UInt8(v) => Some(v.into()),
            DecodedValue::Int16(v) => Some(v.into()),
            DecodedValue::UInt16(v) => Some(v.into()),
            DecodedValue::Int32(v) => Some(v.into()),
            DecodedValue::UInt32(v) => Some(v.into()),
            DecodedValue::Int64(v) => Some(v.into()),
            DecodedValue::UInt64(v) => Some(v.into()),
            _ => None,
        }
    }

    /// Text view of the value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DecodedValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Lower-case hex rendering of a byte array value.
    pub fn to_hex(&self) -> Option<String> {
        match self {
            DecodedValue::Bytes(bytes) => {
                use core::fmt::Write;
                let mut out = String::with_capacity(bytes.len() * 2);
                for b in bytes {
                    let _ = write!(out, "{b:02x}");
                }
                Some(out)
            }
            _ => None,
        }
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::Int8(v) => write!(f, "{v}"),
            DecodedValue::UInt8(v) => write!(f, "{v}"),
            DecodedValue::Int16(v) => write!(f, "{v}"),
            DecodedValue::UInt16(v) => write!(f, "{v}"),
            DecodedValue::Int32(v) => write!(f, "{v}"),
            DecodedValue::UInt32(v) => write!(f, "{v}"),
            DecodedValue::Int64(v) => write!(f, "{v}"),
            DecodedValue::UInt64(v) => write!(f, "{v}"),
            DecodedValue::Float32(v) => write!(f, "{v}"),
            DecodedValue::Float64(v) => write!(f, "{v}"),
            DecodedValue::Text(s) => f.write_str(s),
            DecodedValue::Bytes(_) => f.write_str(&self.to_hex().unwrap_or_default()),
        }
    }
}
