//! Bit-level value decoding.
//!
//! [`decode`] turns a byte window into one [`DecodedValue`]. Numeric windows
//! are addressed most significant bit first: a little-endian window is read
//! back to front, then `bit_count` bits are taken starting
//! `window_bits - bit_offset - bit_count` bits from the front.

use crate::blocks::DataType;
use crate::types::DecodedValue;
use crate::{Error, Result};

/// Widest numeric window the decoder accumulates.
const MAX_WINDOW: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Latin1,
    Utf8,
    Utf16Le,
    Utf16Be,
}

/// Target type of a decode, one per [`DecodedValue`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    Text(TextEncoding),
    Bytes,
}

impl ValueKind {
    /// Pick the target type for a channel's declared type and geometry.
    ///
    /// Integers get the narrowest width covering `bit_offset + bit_count`
    /// bits. Floats must be 32 or 64 bits wide.
    pub fn resolve(data_type: DataType, bit_offset: u8, bit_count: u32) -> Result<Self> {
        let unsupported = || Error::UnsupportedType {
            data_type: data_type.to_string(),
            bit_count,
        };

        let kind = match data_type {
            DataType::UnsignedIntegerLE
            | DataType::UnsignedIntegerBE
            | DataType::SignedIntegerLE
            | DataType::SignedIntegerBE => {
                if bit_count == 0 {
                    return Err(unsupported());
                }
                let signed = matches!(
                    data_type,
                    DataType::SignedIntegerLE | DataType::SignedIntegerBE
                );
                let span = (u64::from(bit_offset) + u64::from(bit_count)).div_ceil(8);
                match (span, signed) {
                    (1, false) => ValueKind::UInt8,
                    (1, true) => ValueKind::Int8,
                    (2, false) => ValueKind::UInt16,
                    (2, true) => ValueKind::Int16,
                    (3..=4, false) => ValueKind::UInt32,
                    (3..=4, true) => ValueKind::Int32,
                    (5..=8, false) => ValueKind::UInt64,
                    (5..=8, true) => ValueKind::Int64,
                    _ => return Err(unsupported()),
                }
            }
            DataType::FloatLE | DataType::FloatBE => match bit_count {
                32 => ValueKind::Float32,
                64 => ValueKind::Float64,
                _ => return Err(unsupported()),
            },
            DataType::StringLatin1 => ValueKind::Text(TextEncoding::Latin1),
            DataType::StringUtf8 => ValueKind::Text(TextEncoding::Utf8),
            DataType::StringUtf16LE => ValueKind::Text(TextEncoding::Utf16Le),
            DataType::StringUtf16BE => ValueKind::Text(TextEncoding::Utf16Be),
            DataType::ByteArray | DataType::MimeSample | DataType::MimeStream => ValueKind::Bytes,
            _ => return Err(unsupported()),
        };
        Ok(kind)
    }

    /// Byte width of numeric kinds; `None` for text and bytes.
    pub fn byte_width(&self) -> Option<usize> {
        match self {
            ValueKind::Int8 | ValueKind::UInt8 => Some(1),
            ValueKind::Int16 | ValueKind::UInt16 => Some(2),
            ValueKind::Int32 | ValueKind::UInt32 | ValueKind::Float32 => Some(4),
            ValueKind::Int64 | ValueKind::UInt64 | ValueKind::Float64 => Some(8),
            ValueKind::Text(_) | ValueKind::Bytes => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Int8 => "int8",
            ValueKind::UInt8 => "uint8",
            ValueKind::Int16 => "int16",
            ValueKind::UInt16 => "uint16",
            ValueKind::Int32 => "int32",
            ValueKind::UInt32 => "uint32",
            ValueKind::Int64 => "int64",
            ValueKind::UInt64 => "uint64",
            ValueKind::Float32 => "float32",
            ValueKind::Float64 => "float64",
            ValueKind::Text(_) => "string",
            ValueKind::Bytes => "bytes",
        }
    }
}

/// Decode one value from `bytes`.
///
/// Text and byte kinds take the whole window as-is. Numeric kinds need a
/// window at least as wide as the kind and read `bit_count` bits located
/// `bit_offset` bits above the least significant end.
pub fn decode(
    bytes: &[u8],
    order: ByteOrder,
    kind: ValueKind,
    bit_offset: u32,
    bit_count: u32,
) -> Result<DecodedValue> {
    let Some(width) = kind.byte_width() else {
        return Ok(decode_bytes(bytes, kind));
    };

    if bytes.len() < width {
        return Err(Error::InsufficientData {
            required: width,
            actual: bytes.len(),
            kind: kind.name(),
        });
    }
    if bytes.len() > MAX_WINDOW || bit_count == 0 || bit_count as usize > width * 8 {
        return Err(Error::UnsupportedType {
            data_type: kind.name().to_string(),
            bit_count,
        });
    }

    let window_bits = bytes.len() * 8;
    let field_end = bit_offset as usize + bit_count as usize;
    if field_end > window_bits {
        return Err(Error::InsufficientData {
            required: field_end.div_ceil(8),
            actual: bytes.len(),
            kind: kind.name(),
        });
    }

    let raw = extract_bits(bytes, order, bit_offset as usize, bit_count as usize);

    let value = match kind {
        ValueKind::UInt8 => DecodedValue::UInt8(raw as u8),
        ValueKind::UInt16 => DecodedValue::UInt16(raw as u16),
        ValueKind::UInt32 => DecodedValue::UInt32(raw as u32),
        ValueKind::UInt64 => DecodedValue::UInt64(raw as u64),
        ValueKind::Int8 => DecodedValue::Int8(sign_extend(raw, bit_count) as i8),
        ValueKind::Int16 => DecodedValue::Int16(sign_extend(raw, bit_count) as i16),
        ValueKind::Int32 => DecodedValue::Int32(sign_extend(raw, bit_count) as i32),
        ValueKind::Int64 => DecodedValue::Int64(sign_extend(raw, bit_count) as i64),
        ValueKind::Float32 => DecodedValue::Float32(f32::from_bits(raw as u32)),
        ValueKind::Float64 => DecodedValue::Float64(f64::from_bits(raw as u64)),
        ValueKind::Text(_) | ValueKind::Bytes => decode_bytes(bytes, kind),
    };
    Ok(value)
}

/// Take `bit_count` bits from the big-endian view of the window.
#[inline]
fn extract_bits(bytes: &[u8], order: ByteOrder, bit_offset: usize, bit_count: usize) -> u128 {
    let n = bytes.len();
    let mut acc = 0u128;
    for i in 0..n {
        let byte = match order {
            ByteOrder::Big => bytes[i],
            ByteOrder::Little => bytes[n - 1 - i],
        };
        acc = (acc << 8) | u128::from(byte);
    }

    let window_bits = n * 8;
    let start = window_bits - bit_offset - bit_count;
    let shift = window_bits - start - bit_count;
    let mask = if bit_count >= 128 {
        u128::MAX
    } else {
        (1u128 << bit_count) - 1
    };
    (acc >> shift) & mask
}

#[inline]
fn sign_extend(raw: u128, bit_count: u32) -> i128 {
    let unused = 128 - bit_count;
    ((raw << unused) as i128) >> unused
}

fn decode_bytes(bytes: &[u8], kind: ValueKind) -> DecodedValue {
    match kind {
        ValueKind::Text(TextEncoding::Latin1) => {
            let s: String = bytes.iter().map(|&b| char::from(b)).collect();
            DecodedValue::Text(s.trim_end_matches('\0').to_string())
        }
        ValueKind::Text(TextEncoding::Utf8) => DecodedValue::Text(
            String::from_utf8_lossy(bytes)
                .trim_end_matches('\0')
                .to_string(),
        ),
        ValueKind::Text(enc @ (TextEncoding::Utf16Le | TextEncoding::Utf16Be)) => {
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|c| match enc {
                    TextEncoding::Utf16Le => u16::from_le_bytes([c[0], c[1]]),
                    _ => u16::from_be_bytes([c[0], c[1]]),
                })
                .collect();
            DecodedValue::Text(
                String::from_utf16_lossy(&units)
                    .trim_end_matches('\0')
                    .to_string(),
            )
        }
        _ => DecodedValue::Bytes(bytes.to_vec()),
    }
}

/// Position and decoding rule of one field inside a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout {
    /// Offset of the field's first byte from the start of the record.
    pub byte_offset: usize,
    /// Bytes the field occupies in the record.
    pub span: usize,
    pub kind: ValueKind,
    pub order: ByteOrder,
    pub bit_offset: u32,
    pub bit_count: u32,
}

impl FieldLayout {
    /// Layout of a channel value. `byte_offset` already includes the
    /// record ID.
    pub fn new(
        data_type: DataType,
        byte_offset: usize,
        bit_offset: u8,
        bit_count: u32,
    ) -> Result<Self> {
        let kind = ValueKind::resolve(data_type, bit_offset, bit_count)?;
        let span = match kind.byte_width() {
            Some(_) => (bit_offset as usize + bit_count as usize).div_ceil(8),
            None => (bit_count / 8) as usize,
        };
        let order = if data_type.is_big_endian() {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        };
        Ok(Self {
            byte_offset,
            span,
            kind,
            order,
            bit_offset: u32::from(bit_offset),
            bit_count,
        })
    }

    /// A single bit read as `UInt8` 0 or 1.
    pub fn bit(byte_offset: usize, bit: u8) -> Self {
        Self {
            byte_offset,
            span: 1,
            kind: ValueKind::UInt8,
            order: ByteOrder::Little,
            bit_offset: u32::from(bit & 7),
            bit_count: 1,
        }
    }

    /// Offset one past the field's last byte.
    #[inline]
    pub fn end(&self) -> usize {
        self.byte_offset + self.span
    }

    /// Decode the `span` bytes of the field.
    ///
    /// A span narrower than the kind is zero-extended on its most
    /// significant side before decoding.
    pub fn decode(&self, field: &[u8]) -> Result<DecodedValue> {
        match self.kind.byte_width() {
            Some(width) if field.len() < width => {
                let mut window = [0u8; MAX_WINDOW];
                let pad = width - field.len();
                match self.order {
                    ByteOrder::Little => window[..field.len()].copy_from_slice(field),
                    ByteOrder::Big => window[pad..width].copy_from_slice(field),
                }
                decode(
                    &window[..width],
                    self.order,
                    self.kind,
                    self.bit_offset,
                    self.bit_count,
                )
            }
            _ => decode(field, self.order, self.kind, self.bit_offset, self.bit_count),
        }
    }
}
