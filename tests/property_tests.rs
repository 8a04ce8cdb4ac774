//! Property-based tests for the bit decoder and the record reader.

use proptest::prelude::*;

use mdf4_signals::DataType;
use mdf4_signals::DecodedValue;
use mdf4_signals::parsing::decoder::{ByteOrder, FieldLayout, ValueKind, decode};
use mdf4_signals::parsing::dispatcher::FragmentSink;
use mdf4_signals::parsing::record_reader::{RecordReader, carry_offset};

// ============================================================================
// Generators
// ============================================================================

/// Window width in bytes, a bit position and a field width that fit in it.
fn arb_geometry() -> impl Strategy<Value = (usize, u32, u32)> {
    prop_oneof![Just(1usize), Just(2), Just(4), Just(8)].prop_flat_map(|width| {
        let bits = (width * 8) as u32;
        (0..bits).prop_flat_map(move |offset| (Just(width), Just(offset), 1..=bits - offset))
    })
}

fn arb_order() -> impl Strategy<Value = ByteOrder> {
    prop_oneof![Just(ByteOrder::Little), Just(ByteOrder::Big)]
}

fn unsigned_kind(width: usize) -> ValueKind {
    match width {
        1 => ValueKind::UInt8,
        2 => ValueKind::UInt16,
        4 => ValueKind::UInt32,
        _ => ValueKind::UInt64,
    }
}

fn signed_kind(width: usize) -> ValueKind {
    match width {
        1 => ValueKind::Int8,
        2 => ValueKind::Int16,
        4 => ValueKind::Int32,
        _ => ValueKind::Int64,
    }
}

/// Place `value` at `bit_offset` of a `width`-byte window.
fn encode(value: u64, width: usize, order: ByteOrder, bit_offset: u32) -> Vec<u8> {
    let raw = u128::from(value) << bit_offset;
    let le = raw.to_le_bytes();
    let mut window = le[..width].to_vec();
    if order == ByteOrder::Big {
        window.reverse();
    }
    window
}

fn mask(bit_count: u32) -> u64 {
    if bit_count >= 64 {
        u64::MAX
    } else {
        (1u64 << bit_count) - 1
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn unsigned_fields_round_trip(
        (width, bit_offset, bit_count) in arb_geometry(),
        order in arb_order(),
        value in any::<u64>(),
    ) {
        let value = value & mask(bit_count);
        let window = encode(value, width, order, bit_offset);
        let decoded = decode(&window, order, unsigned_kind(width), bit_offset, bit_count).unwrap();
        prop_assert_eq!(decoded.as_i128(), Some(i128::from(value)));
    }

    #[test]
    fn signed_fields_round_trip(
        (width, bit_offset, bit_count) in arb_geometry(),
        order in arb_order(),
        value in any::<i64>(),
    ) {
        // keep the value representable in `bit_count` bits
        let shift = 64 - bit_count;
        let value = (value << shift) >> shift;
        let window = encode(value as u64 & mask(bit_count), width, order, bit_offset);
        let decoded = decode(&window, order, signed_kind(width), bit_offset, bit_count).unwrap();
        prop_assert_eq!(decoded.as_i128(), Some(i128::from(value)));
    }

    #[test]
    fn carry_offset_points_into_next_buffer(stride in 1usize..64, len in 1usize..1024) {
        prop_assume!(len % stride != 0);
        prop_assert_eq!(carry_offset(0, len, stride), stride - len % stride);
    }

    #[test]
    fn split_stream_matches_whole_stream(
        count in 1u16..64,
        pad in 0usize..6,
        cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..6),
    ) {
        let stride = 2 + pad;
        let mut stream = Vec::new();
        for i in 0..count {
            stream.extend_from_slice(&i.to_le_bytes());
            stream.extend(std::iter::repeat_n(0xEE, pad));
        }
        let layout = FieldLayout::new(DataType::UnsignedIntegerLE, 0, 0, 16).unwrap();

        let mut whole = RecordReader::new(layout, stride, u64::from(count)).unwrap();
        whole.accept(&stream).unwrap();
        let expected = whole.finish().unwrap();
        prop_assert_eq!(expected.len(), count as usize);

        let mut points: Vec<usize> = cuts.iter().map(|c| c.index(stream.len())).collect();
        points.push(0);
        points.push(stream.len());
        points.sort_unstable();
        points.dedup();

        let mut split = RecordReader::new(layout, stride, u64::from(count)).unwrap();
        for pair in points.windows(2) {
            split.accept(&stream[pair[0]..pair[1]]).unwrap();
        }
        prop_assert_eq!(split.finish().unwrap(), expected);
    }
}

#[test]
fn endpoint_rows_consume_the_buffer_exactly() {
    let layout = FieldLayout::new(DataType::UnsignedIntegerLE, 0, 0, 16).unwrap();
    let mut reader = RecordReader::new(layout, 4, 3).unwrap();
    reader
        .accept(&[
            0x01, 0x00, 0xAA, 0xAA, 0x02, 0x00, 0xBB, 0xBB, 0x03, 0x00, 0xCC, 0xCC,
        ])
        .unwrap();
    assert_eq!(reader.records_seen(), 3);
    assert_eq!(
        reader.finish().unwrap(),
        vec![
            DecodedValue::UInt16(1),
            DecodedValue::UInt16(2),
            DecodedValue::UInt16(3)
        ]
    );
}
