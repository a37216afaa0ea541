//! Test utilities for integration tests.
//!
//! This module provides a request-tracking range reader and a builder for
//! test TIFF files with linked directory chains, masks and JPEG tables.

use async_trait::async_trait;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{GrayImage, Luma};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use cog_dumper::error::IoError;
use cog_dumper::io::RangeReader;

// =============================================================================
// Mock Range Reader with Request Tracking
// =============================================================================

/// A mock range reader that tracks all read requests.
///
/// This is useful for verifying how many reads the decoder issues.
pub struct TrackingMockReader {
    data: Bytes,
    identifier: String,
    request_count: Arc<AtomicUsize>,
    requests: Arc<RwLock<Vec<(u64, usize)>>>,
}

impl TrackingMockReader {
    pub fn new(data: Vec<u8>, identifier: impl Into<String>) -> Self {
        Self {
            data: Bytes::from(data),
            identifier: identifier.into(),
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    pub async fn get_requests(&self) -> Vec<(u64, usize)> {
        self.requests.read().await.clone()
    }
}

impl Clone for TrackingMockReader {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            identifier: self.identifier.clone(),
            request_count: Arc::clone(&self.request_count),
            requests: Arc::clone(&self.requests),
        }
    }
}

#[async_trait]
impl RangeReader for TrackingMockReader {
    async fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.write().await.push((offset, len));

        let start = offset as usize;
        let end = start + len;
        if end > self.data.len() {
            return Err(IoError::RangeOutOfBounds {
                offset,
                requested: len as u64,
                size: self.data.len() as u64,
            });
        }
        Ok(self.data.slice(start..end))
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

// =============================================================================
// Test JPEG Creation
// =============================================================================

/// Create a test JPEG image with a simple gradient pattern.
pub fn create_test_jpeg(width: u32, height: u32, quality: u8) -> Vec<u8> {
    let img = GrayImage::from_fn(width, height, |x, y| {
        let val = ((x + y) % 256) as u8;
        Luma([val])
    });

    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    encoder.encode_image(&img).unwrap();
    buf
}

/// Split a complete JPEG into a `JPEGTables` blob and an abbreviated tile.
///
/// Every segment between SOI and SOS goes into the tables (wrapped in
/// SOI/EOI); the tile keeps SOI followed by the scan.
pub fn split_jpeg_tables(jpeg: &[u8]) -> (Vec<u8>, Vec<u8>) {
    assert_eq!(&jpeg[0..2], &[0xFF, 0xD8], "not a JPEG");

    let mut pos = 2;
    loop {
        assert_eq!(jpeg[pos], 0xFF, "expected a marker at {}", pos);
        if jpeg[pos + 1] == 0xDA {
            break;
        }
        let len = u16::from_be_bytes([jpeg[pos + 2], jpeg[pos + 3]]) as usize;
        pos += 2 + len;
    }

    let mut tables = vec![0xFF, 0xD8];
    tables.extend_from_slice(&jpeg[2..pos]);
    tables.extend_from_slice(&[0xFF, 0xD9]);

    let mut tile = vec![0xFF, 0xD8];
    tile.extend_from_slice(&jpeg[pos..]);

    (tables, tile)
}

/// Whether `data` contains a DQT segment.
pub fn has_dqt(data: &[u8]) -> bool {
    data.windows(2).any(|w| w == [0xFF, 0xDB])
}

// =============================================================================
// TIFF File Builders
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteOrderType {
    LittleEndian,
    BigEndian,
}

/// Builder for creating test TIFF files.
///
/// IFDs are laid out in order, each directly followed by its out-of-line
/// tag values and then its tile data. Each IFD links to the next; the last
/// one terminates the chain unless [`TiffBuilder::link_last_to`] is used.
pub struct TiffBuilder {
    byte_order: ByteOrderType,
    is_bigtiff: bool,
    ifds: Vec<IfdBuilder>,
    last_link: Option<usize>,
}

impl TiffBuilder {
    pub fn new() -> Self {
        Self {
            byte_order: ByteOrderType::LittleEndian,
            is_bigtiff: false,
            ifds: Vec::new(),
            last_link: None,
        }
    }

    pub fn with_byte_order(mut self, order: ByteOrderType) -> Self {
        self.byte_order = order;
        self
    }

    pub fn with_bigtiff(mut self, is_bigtiff: bool) -> Self {
        self.is_bigtiff = is_bigtiff;
        self
    }

    pub fn add_ifd(mut self, ifd: IfdBuilder) -> Self {
        self.ifds.push(ifd);
        self
    }

    /// Point the last IFD's next link at IFD `index` to create a cycle.
    pub fn link_last_to(mut self, index: usize) -> Self {
        self.last_link = Some(index);
        self
    }

    /// Build the TIFF file data.
    pub fn build(self) -> Vec<u8> {
        let mut w = Writer {
            data: Vec::new(),
            byte_order: self.byte_order,
            word: if self.is_bigtiff { 8 } else { 4 },
        };

        // Header
        match self.byte_order {
            ByteOrderType::LittleEndian => w.data.extend(b"II"),
            ByteOrderType::BigEndian => w.data.extend(b"MM"),
        }
        if self.is_bigtiff {
            w.put(43, 2);
            w.put(8, 2); // Offset size
            w.put(0, 2); // Reserved
        } else {
            w.put(42, 2);
        }
        let mut link_pos = w.data.len();
        w.put(0, w.word);

        let mut ifd_offsets = Vec::new();
        for ifd in &self.ifds {
            let offset = w.data.len() as u64;
            w.patch(link_pos, offset);
            ifd_offsets.push(offset);
            link_pos = ifd.write_to(&mut w);
        }

        if let Some(index) = self.last_link {
            w.patch(link_pos, ifd_offsets[index]);
        }

        w.data
    }
}

impl Default for TiffBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one tiled IFD.
#[derive(Clone)]
pub struct IfdBuilder {
    width: u32,
    height: u32,
    tile_width: u32,
    tile_height: u32,
    compression: Option<u16>,
    tiles: Vec<Vec<u8>>,
    jpeg_tables: Option<Vec<u8>>,
    extra_entries: Vec<(u16, u16, u64, Vec<u8>)>,
    omit_tile_offsets: bool,
}

impl IfdBuilder {
    /// A `width` x `height` image in `tile_width` x `tile_height` tiles.
    ///
    /// Tile `i` defaults to `[0xFF, 0xD8, i as u8, 0xFF, 0xD9]`.
    pub fn new(width: u32, height: u32, tile_width: u32, tile_height: u32) -> Self {
        let tiles_x = width.div_ceil(tile_width);
        let tiles_y = height.div_ceil(tile_height);
        let tiles = (0..tiles_x * tiles_y)
            .map(|i| vec![0xFF, 0xD8, i as u8, 0xFF, 0xD9])
            .collect();

        Self {
            width,
            height,
            tile_width,
            tile_height,
            compression: None,
            tiles,
            jpeg_tables: None,
            extra_entries: Vec::new(),
            omit_tile_offsets: false,
        }
    }

    /// Set the Compression tag. Without this the tag is omitted.
    pub fn compression(mut self, compression: u16) -> Self {
        self.compression = Some(compression);
        self
    }

    /// Replace every tile's payload.
    pub fn tiles(mut self, tiles: Vec<Vec<u8>>) -> Self {
        self.tiles = tiles;
        self
    }

    /// Use the same payload for every tile.
    pub fn fill_tiles(mut self, tile: Vec<u8>) -> Self {
        let count = self.tiles.len();
        self.tiles = vec![tile; count];
        self
    }

    pub fn jpeg_tables(mut self, tables: Vec<u8>) -> Self {
        self.jpeg_tables = Some(tables);
        self
    }

    /// Add an arbitrary entry with raw, already byte-ordered value bytes.
    pub fn extra_entry(mut self, tag: u16, field_type: u16, count: u64, value: Vec<u8>) -> Self {
        self.extra_entries.push((tag, field_type, count, value));
        self
    }

    pub fn without_tile_offsets(mut self) -> Self {
        self.omit_tile_offsets = true;
        self
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Write the IFD, its values and its tiles at the end of `w`.
    ///
    /// Returns the position of the next-IFD link.
    fn write_to(&self, w: &mut Writer) -> usize {
        let word = w.word;
        let int_type: u16 = if word == 8 { 16 } else { 4 };

        // (tag, type, count, payload), payload filled later for tile offsets
        let mut entries: Vec<(u16, u16, u64, Vec<u8>)> = vec![
            (256, 4, 1, w.encode(self.width as u64, 4)),
            (257, 4, 1, w.encode(self.height as u64, 4)),
            (322, 3, 1, w.encode(self.tile_width as u64, 2)),
            (323, 3, 1, w.encode(self.tile_height as u64, 2)),
        ];
        if let Some(compression) = self.compression {
            entries.push((259, 3, 1, w.encode(compression as u64, 2)));
        }
        let counts: Vec<u8> = self
            .tiles
            .iter()
            .flat_map(|t| w.encode(t.len() as u64, word))
            .collect();
        entries.push((325, int_type, self.tiles.len() as u64, counts));
        if !self.omit_tile_offsets {
            let placeholder = vec![0; self.tiles.len() * word];
            entries.push((324, int_type, self.tiles.len() as u64, placeholder));
        }
        if let Some(ref tables) = self.jpeg_tables {
            entries.push((347, 7, tables.len() as u64, tables.clone()));
        }
        entries.extend(self.extra_entries.iter().cloned());
        entries.sort_by_key(|e| e.0);

        // Layout: IFD block, out-of-line values, tiles
        let ifd_start = w.data.len();
        let count_size = if word == 8 { 8 } else { 2 };
        let block_len = count_size + entries.len() * (4 + 2 * word) + word;
        let mut value_pos = ifd_start + block_len;
        let mut value_offsets = Vec::new();
        for entry in &entries {
            if entry.3.len() > word {
                value_offsets.push(Some(value_pos));
                value_pos += entry.3.len();
            } else {
                value_offsets.push(None);
            }
        }

        let mut tile_pos = value_pos as u64;
        let tile_offsets: Vec<u8> = self
            .tiles
            .iter()
            .flat_map(|t| {
                let offset = tile_pos;
                tile_pos += t.len() as u64;
                w.encode(offset, word)
            })
            .collect();
        for entry in entries.iter_mut() {
            if entry.0 == 324 {
                entry.3 = tile_offsets.clone();
            }
        }

        // IFD block
        w.put(entries.len() as u64, count_size);
        for (entry, value_offset) in entries.iter().zip(&value_offsets) {
            w.put(entry.0 as u64, 2);
            w.put(entry.1 as u64, 2);
            w.put(entry.2, word);
            match value_offset {
                Some(offset) => w.put(*offset as u64, word),
                None => {
                    let mut slot = entry.3.clone();
                    slot.resize(word, 0);
                    w.data.extend(slot);
                }
            }
        }
        let link_pos = w.data.len();
        w.put(0, word);

        // Out-of-line values
        for (entry, value_offset) in entries.iter().zip(&value_offsets) {
            if value_offset.is_some() {
                w.data.extend(&entry.3);
            }
        }

        // Tiles
        for tile in &self.tiles {
            w.data.extend(tile);
        }

        link_pos
    }
}

/// Byte-order aware output buffer.
struct Writer {
    data: Vec<u8>,
    byte_order: ByteOrderType,
    word: usize,
}

impl Writer {
    fn encode(&self, value: u64, size: usize) -> Vec<u8> {
        match self.byte_order {
            ByteOrderType::LittleEndian => value.to_le_bytes()[..size].to_vec(),
            ByteOrderType::BigEndian => value.to_be_bytes()[8 - size..].to_vec(),
        }
    }

    fn put(&mut self, value: u64, size: usize) {
        let bytes = self.encode(value, size);
        self.data.extend(bytes);
    }

    fn patch(&mut self, pos: usize, value: u64) {
        let bytes = self.encode(value, self.word);
        self.data[pos..pos + self.word].copy_from_slice(&bytes);
    }
}

// =============================================================================
// Common Fixtures
// =============================================================================

/// Encode `value` as `size` bytes in `order`.
pub fn encode(order: ByteOrderType, value: u64, size: usize) -> Vec<u8> {
    Writer {
        data: Vec::new(),
        byte_order: order,
        word: 4,
    }
    .encode(value, size)
}

/// Five-level pyramid, 1024x1024 down to 64x64 in 256x256 tiles, no
/// Compression tag (JPEG by default), little-endian classic TIFF.
pub fn five_level_pyramid() -> TiffBuilder {
    let mut builder = TiffBuilder::new();
    for size in [1024, 512, 256, 128, 64] {
        builder = builder.add_ifd(IfdBuilder::new(size, size, 256, 256));
    }
    builder
}

/// Single-level 512x512 JPEG image in 256x256 tiles.
pub fn single_level(order: ByteOrderType, bigtiff: bool) -> Vec<u8> {
    TiffBuilder::new()
        .with_byte_order(order)
        .with_bigtiff(bigtiff)
        .add_ifd(IfdBuilder::new(512, 512, 256, 256).compression(7))
        .build()
}
