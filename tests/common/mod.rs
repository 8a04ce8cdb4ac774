//! Builders for synthetic MDF4 byte images.
#![allow(dead_code)]

use miniz_oxide::deflate::compress_to_vec_zlib;

pub const HD_ADDR: u64 = 64;

/// Appends blocks to an image whose first 64 bytes hold the ID block.
pub struct ImageBuilder {
    bytes: Vec<u8>,
}

impl Default for ImageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBuilder {
    /// An image with a version 4.10 ID block and nothing else.
    pub fn new() -> Self {
        Self::with_id(b"MDF     ", 410)
    }

    pub fn with_id(file_id: &[u8; 8], version: u16) -> Self {
        let mut bytes = vec![0u8; 64];
        bytes[0..8].copy_from_slice(file_id);
        bytes[8..16].copy_from_slice(b"4.10    ");
        bytes[16..24].copy_from_slice(b"testgen ");
        bytes[28..30].copy_from_slice(&version.to_le_bytes());
        Self { bytes }
    }

    /// Append a block and return its address. Blocks start 8-byte aligned.
    pub fn block(&mut self, tag: &[u8; 4], links: &[u64], data: &[u8]) -> u64 {
        while self.bytes.len() % 8 != 0 {
            self.bytes.push(0);
        }
        let address = self.bytes.len() as u64;
        let length = 24 + links.len() * 8 + data.len();
        self.bytes.extend_from_slice(tag);
        self.bytes.extend_from_slice(&0u32.to_le_bytes());
        self.bytes.extend_from_slice(&(length as u64).to_le_bytes());
        self.bytes.extend_from_slice(&(links.len() as u64).to_le_bytes());
        for link in links {
            self.bytes.extend_from_slice(&link.to_le_bytes());
        }
        self.bytes.extend_from_slice(data);
        address
    }

    /// Overwrite link `index` of the block at `block`.
    pub fn set_link(&mut self, block: u64, index: usize, target: u64) {
        let at = block as usize + 24 + index * 8;
        self.bytes[at..at + 8].copy_from_slice(&target.to_le_bytes());
    }

    pub fn hd(&mut self, first_dg: u64) -> u64 {
        let mut data = vec![0u8; 32];
        data[0..8].copy_from_slice(&1_700_000_000_000_000_000u64.to_le_bytes());
        let address = self.block(b"##HD", &[first_dg, 0, 0, 0, 0, 0], &data);
        assert_eq!(address, HD_ADDR, "HD must directly follow the ID block");
        address
    }

    pub fn tx(&mut self, text: &str) -> u64 {
        let mut data = text.as_bytes().to_vec();
        data.push(0);
        self.block(b"##TX", &[], &data)
    }

    pub fn dt(&mut self, payload: &[u8]) -> u64 {
        self.block(b"##DT", &[], payload)
    }

    /// SD block holding one `[u32 length][bytes]` record per entry.
    pub fn sd(&mut self, records: &[&[u8]]) -> u64 {
        self.block(b"##SD", &[], &sd_payload(records))
    }

    /// DL node with per-child offsets.
    pub fn dl(&mut self, next: u64, children: &[u64], offsets: &[u64]) -> u64 {
        let mut links = vec![next];
        links.extend_from_slice(children);
        let mut data = vec![0u8; 4];
        data.extend_from_slice(&(children.len() as u32).to_le_bytes());
        for offset in offsets {
            data.extend_from_slice(&offset.to_le_bytes());
        }
        self.block(b"##DL", &links, &data)
    }

    /// DL node whose children share one length.
    pub fn dl_equal(&mut self, next: u64, children: &[u64], child_len: u64) -> u64 {
        let mut links = vec![next];
        links.extend_from_slice(children);
        let mut data = vec![1u8, 0, 0, 0];
        data.extend_from_slice(&(children.len() as u32).to_le_bytes());
        data.extend_from_slice(&child_len.to_le_bytes());
        self.block(b"##DL", &links, &data)
    }

    pub fn hl(&mut self, first_dl: u64) -> u64 {
        let mut data = vec![0u8; 8];
        data[0..2].copy_from_slice(&1u16.to_le_bytes());
        self.block(b"##HL", &[first_dl], &data)
    }

    /// DZ block standing for a block of kind `claimed` (e.g. `b"DT"`).
    pub fn dz(&mut self, claimed: &[u8; 2], payload: &[u8]) -> u64 {
        let compressed = compress_to_vec_zlib(payload, 6);
        self.dz_raw(claimed, 0, 0, payload.len() as u64, &compressed)
    }

    /// DZ block with transposition over `columns` columns.
    pub fn dz_transposed(&mut self, claimed: &[u8; 2], payload: &[u8], columns: usize) -> u64 {
        let compressed = compress_to_vec_zlib(&transpose(payload, columns), 6);
        self.dz_raw(claimed, 1, columns as u32, payload.len() as u64, &compressed)
    }

    pub fn dz_raw(
        &mut self,
        claimed: &[u8; 2],
        zip_type: u8,
        zip_parameter: u32,
        original_len: u64,
        compressed: &[u8],
    ) -> u64 {
        let mut data = Vec::new();
        data.extend_from_slice(claimed);
        data.push(zip_type);
        data.push(0);
        data.extend_from_slice(&zip_parameter.to_le_bytes());
        data.extend_from_slice(&original_len.to_le_bytes());
        data.extend_from_slice(&(compressed.len() as u64).to_le_bytes());
        data.extend_from_slice(compressed);
        self.block(b"##DZ", &[], &data)
    }

    pub fn cc_linear(&mut self, offset: f64, factor: f64) -> u64 {
        self.cc(1, &[], &[offset, factor])
    }

    /// Value-to-text conversion; `texts` are TX addresses, the last link is
    /// the default.
    pub fn cc_value_to_text(&mut self, keys: &[f64], texts: &[u64], default: u64) -> u64 {
        let mut refs = texts.to_vec();
        refs.push(default);
        self.cc(7, &refs, keys)
    }

    pub fn cc(&mut self, cc_type: u8, refs: &[u64], values: &[f64]) -> u64 {
        let mut links = vec![0u64; 4];
        links.extend_from_slice(refs);
        let mut data = vec![cc_type, 0];
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&(refs.len() as u16).to_le_bytes());
        data.extend_from_slice(&(values.len() as u16).to_le_bytes());
        for v in values {
            data.extend_from_slice(&v.to_le_bytes());
        }
        self.block(b"##CC", &links, &data)
    }

    pub fn cn(&mut self, spec: &ChannelSpec) -> u64 {
        let name = self.tx(&spec.name);
        let unit = match &spec.unit {
            Some(unit) => self.tx(unit),
            None => 0,
        };
        let links = [
            0,
            0,
            name,
            0,
            spec.conversion,
            spec.data,
            unit,
            0,
        ];
        let mut data = vec![0u8; 72];
        data[0] = spec.channel_type;
        data[2] = spec.data_type;
        data[3] = spec.bit_offset;
        data[4..8].copy_from_slice(&spec.byte_offset.to_le_bytes());
        data[8..12].copy_from_slice(&spec.bit_count.to_le_bytes());
        data[12..16].copy_from_slice(&spec.flags.to_le_bytes());
        data[16..20].copy_from_slice(&spec.inval_bit.to_le_bytes());
        self.block(b"##CN", &links, &data)
    }

    /// CG block; channels are linked in the given order.
    pub fn cg(&mut self, spec: &GroupSpec, channels: &[u64]) -> u64 {
        for pair in channels.windows(2) {
            self.set_link(pair[0], 0, pair[1]);
        }
        let name = match &spec.name {
            Some(name) => self.tx(name),
            None => 0,
        };
        let links = [0, channels.first().copied().unwrap_or(0), name, 0, 0, 0];
        let mut data = vec![0u8; 32];
        data[0..8].copy_from_slice(&spec.record_id.to_le_bytes());
        data[8..16].copy_from_slice(&spec.cycle_count.to_le_bytes());
        data[16..18].copy_from_slice(&spec.flags.to_le_bytes());
        data[24..28].copy_from_slice(&spec.data_bytes.to_le_bytes());
        data[28..32].copy_from_slice(&spec.inval_bytes.to_le_bytes());
        self.block(b"##CG", &links, &data)
    }

    /// DG block; channel groups are linked in the given order.
    pub fn dg(&mut self, data: u64, record_id_size: u8, groups: &[u64]) -> u64 {
        for pair in groups.windows(2) {
            self.set_link(pair[0], 0, pair[1]);
        }
        let links = [0, groups.first().copied().unwrap_or(0), data, 0];
        let mut body = vec![0u8; 8];
        body[0] = record_id_size;
        self.block(b"##DG", &links, &body)
    }

    /// Link data groups in order and write the HD block pointing at the
    /// first. Must be called before any other block is added.
    pub fn link_dgs(&mut self, dgs: &[u64]) {
        for pair in dgs.windows(2) {
            self.set_link(pair[0], 0, pair[1]);
        }
        self.set_link(HD_ADDR, 0, dgs.first().copied().unwrap_or(0));
    }

    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

#[derive(Debug, Clone)]
pub struct ChannelSpec {
    pub name: String,
    pub unit: Option<String>,
    pub channel_type: u8,
    pub data_type: u8,
    pub bit_offset: u8,
    pub byte_offset: u32,
    pub bit_count: u32,
    pub flags: u32,
    pub inval_bit: u32,
    pub conversion: u64,
    pub data: u64,
}

impl ChannelSpec {
    pub fn new(name: &str, data_type: u8, byte_offset: u32, bit_count: u32) -> Self {
        Self {
            name: name.to_string(),
            unit: None,
            channel_type: 0,
            data_type,
            bit_offset: 0,
            byte_offset,
            bit_count,
            flags: 0,
            inval_bit: 0,
            conversion: 0,
            data: 0,
        }
    }

    pub fn master(mut self) -> Self {
        self.channel_type = 2;
        self
    }

    pub fn vlsd(mut self, data: u64) -> Self {
        self.channel_type = 1;
        self.data = data;
        self
    }

    pub fn bits(mut self, bit_offset: u8) -> Self {
        self.bit_offset = bit_offset;
        self
    }

    pub fn unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }

    pub fn conversion(mut self, cc: u64) -> Self {
        self.conversion = cc;
        self
    }

    pub fn invalidation_bit(mut self, pos: u32) -> Self {
        self.flags |= 2;
        self.inval_bit = pos;
        self
    }

    pub fn all_invalid(mut self) -> Self {
        self.flags |= 1;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct GroupSpec {
    pub name: Option<String>,
    pub record_id: u64,
    pub cycle_count: u64,
    pub flags: u16,
    pub data_bytes: u32,
    pub inval_bytes: u32,
}

impl GroupSpec {
    pub fn new(cycle_count: u64, data_bytes: u32) -> Self {
        Self {
            cycle_count,
            data_bytes,
            ..Self::default()
        }
    }
}

pub const UINT_LE: u8 = 0;
pub const UINT_BE: u8 = 1;
pub const INT_LE: u8 = 2;
pub const FLOAT_LE: u8 = 4;
pub const STRING_UTF8: u8 = 7;
pub const BYTE_ARRAY: u8 = 10;

pub fn sd_payload(records: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    for r in records {
        out.extend_from_slice(&(r.len() as u32).to_le_bytes());
        out.extend_from_slice(r);
    }
    out
}

pub fn transpose(data: &[u8], columns: usize) -> Vec<u8> {
    let rows = data.len() / columns;
    let body = rows * columns;
    let mut out = data.to_vec();
    for r in 0..rows {
        for c in 0..columns {
            out[c * rows + r] = data[r * columns + c];
        }
    }
    out
}

/// Records of `count` rows with a little-endian `u16` counter at offset 0
/// and filler bytes up to `stride`.
pub fn counter_records(count: u16, stride: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(count as usize * stride);
    for i in 1..=count {
        out.extend_from_slice(&i.to_le_bytes());
        out.extend(std::iter::repeat_n(0xAA, stride - 2));
    }
    out
}

/// One file with a single data group and a single channel group holding a
/// `u16` counter at offset 0 of `stride`-byte records.
///
/// `data` is called after the metadata blocks are written and returns the
/// address of the group's block graph.
pub fn single_counter_file(
    count: u64,
    stride: u32,
    data: impl FnOnce(&mut ImageBuilder) -> u64,
) -> Vec<u8> {
    let mut image = ImageBuilder::new();
    image.hd(0);
    let counter = image.cn(&ChannelSpec::new("counter", UINT_LE, 0, 16));
    let cg = image.cg(&GroupSpec::new(count, stride), &[counter]);
    let dg = image.dg(0, 0, &[cg]);
    image.link_dgs(&[dg]);
    let address = data(&mut image);
    image.set_link(dg, 2, address);
    image.finish()
}
