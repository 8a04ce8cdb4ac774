mod common;

use std::sync::Arc;

use common::*;
use mdf4_signals::{DecodedValue, Error, Mdf, MemorySource, ReadOptions, Result};

fn counters(n: u16) -> Vec<DecodedValue> {
    (1..=n).map(DecodedValue::UInt16).collect()
}

#[test]
fn endpoint_records_decode_in_order() -> Result<()> {
    let bytes = single_counter_file(3, 4, |image| {
        image.dt(&[
            0x01, 0x00, 0xAA, 0xAA, 0x02, 0x00, 0xBB, 0xBB, 0x03, 0x00, 0xCC, 0xCC,
        ])
    });
    let mdf = Mdf::from_bytes(bytes)?;
    assert_eq!(&*mdf.sample("counter")?, counters(3).as_slice());
    Ok(())
}

#[test]
fn data_list_chain_matches_flat_block() -> Result<()> {
    let records = counter_records(10, 4);
    let flat = Mdf::from_bytes(single_counter_file(10, 4, |image| image.dt(&records)))?;

    // 3 DL nodes: two full, one partial
    let chained = Mdf::from_bytes(single_counter_file(10, 4, |image| {
        let dts: Vec<u64> = records.chunks(8).map(|c| image.dt(c)).collect();
        let third = image.dl_equal(0, &dts[4..], 8);
        let second = image.dl_equal(third, &dts[2..4], 8);
        image.dl(second, &dts[0..2], &[0, 8])
    }))?;

    assert_eq!(chained.sample("counter")?, flat.sample("counter")?);
    assert_eq!(&*chained.sample("counter")?, counters(10).as_slice());
    Ok(())
}

#[test]
fn compressed_block_matches_plain_block() -> Result<()> {
    let records = counter_records(50, 6);
    let plain = Mdf::from_bytes(single_counter_file(50, 6, |image| image.dt(&records)))?;
    let zipped = Mdf::from_bytes(single_counter_file(50, 6, |image| image.dz(b"DT", &records)))?;
    let transposed = Mdf::from_bytes(single_counter_file(50, 6, |image| {
        image.dz_transposed(b"DT", &records, 6)
    }))?;

    let expected = plain.sample("counter")?;
    assert_eq!(zipped.sample("counter")?, expected);
    assert_eq!(transposed.sample("counter")?, expected);
    Ok(())
}

#[test]
fn header_list_of_compressed_blocks() -> Result<()> {
    let records = counter_records(12, 4);
    let mdf = Mdf::from_bytes(single_counter_file(12, 4, |image| {
        let first = image.dz(b"DT", &records[..20]);
        let second = image.dz(b"DT", &records[20..]);
        let dl = image.dl(0, &[first, second], &[0, 20]);
        image.hl(dl)
    }))?;
    assert_eq!(&*mdf.sample("counter")?, counters(12).as_slice());
    Ok(())
}

#[test]
fn records_spanning_block_boundaries() -> Result<()> {
    let records = counter_records(9, 4);
    // split points inside records and inside the counter field itself
    let mdf = Mdf::from_bytes(single_counter_file(9, 4, |image| {
        let a = image.dt(&records[..5]);
        let b = image.dt(&records[5..13]);
        let c = image.dt(&records[13..14]);
        let d = image.dt(&records[14..]);
        image.dl(0, &[a, b, c, d], &[0, 5, 13, 14])
    }))?;
    assert_eq!(&*mdf.sample("counter")?, counters(9).as_slice());
    Ok(())
}

#[test]
fn vlsd_channel_reads_every_signal_record() -> Result<()> {
    let mut image = ImageBuilder::new();
    image.hd(0);
    let first = image.sd(&[b"alpha", b"beta"]);
    let second = image.sd(&[b"gamma\0"]);
    let list = image.dl(0, &[first, second], &[0, 17]);
    let cn = image.cn(&ChannelSpec::new("label", STRING_UTF8, 0, 64).vlsd(list));
    let cg = image.cg(&GroupSpec::new(3, 8), &[cn]);
    let dg = image.dg(0, 0, &[cg]);
    image.link_dgs(&[dg]);

    let mdf = Mdf::from_bytes(image.finish())?;
    let labels: Vec<_> = mdf
        .sample("label")?
        .iter()
        .map(|v| v.as_str().map(str::to_owned))
        .collect();
    assert_eq!(
        labels,
        [
            Some("alpha".to_string()),
            Some("beta".to_string()),
            Some("gamma".to_string())
        ]
    );
    Ok(())
}

#[test]
fn vlsd_bytes_in_compressed_signal_data() -> Result<()> {
    let mut image = ImageBuilder::new();
    image.hd(0);
    let sd = image.dz(b"SD", &sd_payload(&[&[0xde, 0xad], &[0xbe, 0xef, 0x01]]));
    let cn = image.cn(&ChannelSpec::new("blob", BYTE_ARRAY, 0, 64).vlsd(sd));
    let cg = image.cg(&GroupSpec::new(2, 8), &[cn]);
    let dg = image.dg(0, 0, &[cg]);
    image.link_dgs(&[dg]);

    let mdf = Mdf::from_bytes(image.finish())?;
    let blobs = mdf.sample("blob")?;
    assert_eq!(blobs[0].to_hex().as_deref(), Some("dead"));
    assert_eq!(blobs[1], DecodedValue::Bytes(vec![0xbe, 0xef, 0x01]));
    Ok(())
}

#[test]
fn vlsd_record_split_between_signal_blocks() -> Result<()> {
    let payload = sd_payload(&[b"alpha", b"beta"]);
    let mut image = ImageBuilder::new();
    image.hd(0);
    // the cut lands inside the length prefix of "beta"
    let first = image.block(b"##SD", &[], &payload[..11]);
    let second = image.block(b"##SD", &[], &payload[11..]);
    let list = image.dl(0, &[first, second], &[0, 11]);
    let cn = image.cn(&ChannelSpec::new("label", STRING_UTF8, 0, 64).vlsd(list));
    let cg = image.cg(&GroupSpec::new(2, 8), &[cn]);
    let dg = image.dg(0, 0, &[cg]);
    image.link_dgs(&[dg]);

    let mdf = Mdf::from_bytes(image.finish())?;
    assert_eq!(
        &*mdf.sample("label")?,
        &[
            DecodedValue::Text("alpha".into()),
            DecodedValue::Text("beta".into())
        ]
    );
    Ok(())
}

#[test]
fn vlsd_short_of_cycle_count_is_a_mismatch() {
    let mut image = ImageBuilder::new();
    image.hd(0);
    let sd = image.sd(&[b"alpha", b"beta"]);
    let cn = image.cn(&ChannelSpec::new("label", STRING_UTF8, 0, 64).vlsd(sd));
    let cg = image.cg(&GroupSpec::new(5, 8), &[cn]);
    let dg = image.dg(0, 0, &[cg]);
    image.link_dgs(&[dg]);

    let mdf = Mdf::from_bytes(image.finish()).unwrap();
    assert!(matches!(
        mdf.sample("label"),
        Err(Error::RecordCountMismatch {
            expected: 5,
            actual: 2
        })
    ));
}

#[test]
fn fixed_channel_ignores_its_data_link() -> Result<()> {
    let mut image = ImageBuilder::new();
    image.hd(0);
    let counter = image.cn(&ChannelSpec::new("counter", UINT_LE, 0, 16));
    let cg = image.cg(&GroupSpec::new(3, 2), &[counter]);
    let records = image.dt(&counter_records(3, 2));
    let dg = image.dg(records, 0, &[cg]);
    image.link_dgs(&[dg]);
    // cn_data of a fixed-length channel points at unrelated data
    let elsewhere = image.dt(&[0xEE; 6]);
    image.set_link(counter, 5, elsewhere);

    let mdf = Mdf::from_bytes(image.finish())?;
    assert_eq!(mdf.channel("counter")?.data_address, None);
    assert_eq!(&*mdf.sample("counter")?, counters(3).as_slice());
    Ok(())
}

fn vlsd_file(data: impl FnOnce(&mut ImageBuilder) -> u64) -> Mdf<MemorySource> {
    let mut image = ImageBuilder::new();
    image.hd(0);
    let cn = image.cn(&ChannelSpec::new("label", STRING_UTF8, 0, 64));
    let cg = image.cg(&GroupSpec::new(1, 8), &[cn]);
    let dg = image.dg(0, 0, &[cg]);
    image.link_dgs(&[dg]);
    let address = data(&mut image);
    // turn the channel into a VLSD channel pointing at `address`
    let mut bytes = image.finish();
    let cn = cn as usize;
    bytes[cn + 88] = 1;
    bytes[cn + 64..cn + 72].copy_from_slice(&address.to_le_bytes());
    Mdf::from_bytes(bytes).unwrap()
}

#[test]
fn record_data_under_vlsd_is_unsupported() {
    let mdf = vlsd_file(|image| image.dt(&[0; 8]));
    match mdf.sample("label") {
        Err(Error::UnsupportedBlockKind { tag, .. }) => assert_eq!(&tag, b"##DT"),
        other => panic!("expected unsupported block kind, got {other:?}"),
    }
}

#[test]
fn channel_group_backed_vlsd_is_unsupported() {
    let mdf = vlsd_file(|image| image.cg(&GroupSpec::new(1, 0), &[]));
    match mdf.sample("label") {
        Err(Error::UnsupportedBlockKind { tag, .. }) => assert_eq!(&tag, b"##CG"),
        other => panic!("expected unsupported block kind, got {other:?}"),
    }
}

#[test]
fn unknown_block_tag_is_reported() {
    let mdf = Mdf::from_bytes(single_counter_file(1, 4, |image| {
        image.block(b"##RD", &[], &[0; 4])
    }))
    .unwrap();
    match mdf.sample("counter") {
        Err(Error::UnsupportedBlockKind { tag, .. }) => assert_eq!(&tag, b"##RD"),
        other => panic!("expected unsupported block kind, got {other:?}"),
    }
}

#[test]
fn truncated_data_block_is_reported() {
    let mut bytes = single_counter_file(4, 4, |image| image.dt(&counter_records(4, 4)));
    bytes.truncate(bytes.len() - 6);
    let mdf = Mdf::from_bytes(bytes).unwrap();
    assert!(matches!(
        mdf.sample("counter"),
        Err(Error::Truncated { .. })
    ));
}

#[test]
fn short_stream_is_a_count_mismatch() {
    let mdf = Mdf::from_bytes(single_counter_file(4, 4, |image| {
        image.dt(&counter_records(3, 4))
    }))
    .unwrap();
    assert!(matches!(
        mdf.sample("counter"),
        Err(Error::RecordCountMismatch {
            expected: 4,
            actual: 3
        })
    ));
    assert!(!mdf.channel("counter").unwrap().is_cached());
}

#[test]
fn cyclic_data_list_is_rejected() {
    let mdf = Mdf::from_bytes(single_counter_file(8, 4, |image| {
        let dt = image.dt(&counter_records(2, 4));
        let dl = image.dl(0, &[dt], &[0]);
        image.set_link(dl, 0, dl);
        dl
    }))
    .unwrap();
    assert!(matches!(
        mdf.sample("counter"),
        Err(Error::BlockChainCycle { .. })
    ));
}

#[test]
fn nesting_beyond_limit_is_rejected() {
    let bytes = single_counter_file(2, 4, |image| {
        let mut address = image.dt(&counter_records(2, 4));
        for _ in 0..4 {
            address = image.dl(0, &[address], &[0]);
        }
        address
    });
    let options = ReadOptions {
        max_chain_depth: 2,
        ..ReadOptions::default()
    };
    let mdf = Mdf::with_source(MemorySource::new(bytes.clone()), options).unwrap();
    assert!(matches!(
        mdf.sample("counter"),
        Err(Error::BlockChainTooDeep { max_depth: 2 })
    ));

    let mdf = Mdf::from_bytes(bytes).unwrap();
    assert_eq!(mdf.sample("counter").unwrap().len(), 2);
}

#[test]
fn wrong_inflated_length_is_a_decompression_error() {
    let records = counter_records(2, 4);
    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&records, 6);
    let mdf = Mdf::from_bytes(single_counter_file(2, 4, |image| {
        image.dz_raw(b"DT", 0, 0, 99, &compressed)
    }))
    .unwrap();
    assert!(matches!(
        mdf.sample("counter"),
        Err(Error::Decompression(_))
    ));
}

#[test]
fn samples_are_cached_until_reread() -> Result<()> {
    let mdf = Mdf::from_bytes(single_counter_file(5, 4, |image| {
        image.dt(&counter_records(5, 4))
    }))?;

    let first = mdf.sample("counter")?;
    let second = mdf.sample("counter")?;
    assert!(Arc::ptr_eq(&first, &second));
    assert!(mdf.data_groups()[0].is_cached());

    let fresh = mdf.reread("counter")?;
    assert!(!Arc::ptr_eq(&first, &fresh));
    assert_eq!(first, fresh);
    Ok(())
}

#[test]
fn memory_optimized_reads_skip_caches() -> Result<()> {
    let bytes = single_counter_file(5, 4, |image| image.dt(&counter_records(5, 4)));
    let mdf = Mdf::with_source(MemorySource::new(bytes), ReadOptions::memory_optimized())?;

    let first = mdf.sample("counter")?;
    let second = mdf.sample("counter")?;
    assert_eq!(first, second);
    assert!(!Arc::ptr_eq(&first, &second));
    assert!(!mdf.channel("counter")?.is_cached());
    assert!(!mdf.data_groups()[0].is_cached());
    Ok(())
}

#[test]
fn channels_extract_concurrently() -> Result<()> {
    let mut image = ImageBuilder::new();
    image.hd(0);
    let names = ["c0", "c1", "c2", "c3"];
    let channels: Vec<u64> = names
        .iter()
        .enumerate()
        .map(|(i, name)| image.cn(&ChannelSpec::new(name, UINT_LE, i as u32 * 2, 16)))
        .collect();
    let cg = image.cg(&GroupSpec::new(200, 8), &channels);
    let mut records = Vec::new();
    for row in 0..200u16 {
        for col in 0..4u16 {
            records.extend_from_slice(&(row * 4 + col).to_le_bytes());
        }
    }
    let data = image.dz(b"DT", &records);
    let dg = image.dg(data, 0, &[cg]);
    image.link_dgs(&[dg]);
    let mdf = Mdf::from_bytes(image.finish())?;
    let mdf = &mdf;

    std::thread::scope(|scope| {
        let handles: Vec<_> = names
            .iter()
            .map(|&name| scope.spawn(move || mdf.sample(name)))
            .collect();
        for (col, handle) in handles.into_iter().enumerate() {
            let samples = handle.join().expect("extraction thread panicked")?;
            assert_eq!(samples.len(), 200);
            assert_eq!(samples[7], DecodedValue::UInt16(7 * 4 + col as u16));
        }
        Ok(())
    })
}
