//! Cloud Optimized GeoTIFF tile access.
//!
//! [`CogReader`] is the entry point of the decoder. It wraps any
//! [`RangeReader`], decodes the header and the whole directory chain on first
//! use, then serves individual tiles with one range read each (two when a
//! mask is attached).
//!
//! # Example
//!
//! ```rust,no_run
//! use cog_dumper::{CogReader, FileRangeReader};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = FileRangeReader::open("cog.tif").await?;
//! let cog = CogReader::new(reader);
//!
//! let tile = cog.get_tile(0, 0, 0).await?;
//! println!("{} ({} bytes)", tile.mime_type, tile.data.len());
//! # Ok(())
//! # }
//! ```

use bytes::{Bytes, BytesMut};
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::TiffError;
use crate::io::RangeReader;

use super::jpeg::insert_tables;
use super::tiff::{read_ifd_chain, ByteOrder, ImageDescriptor, OverviewPyramid, TiffHeader};

// =============================================================================
// Tile
// =============================================================================

/// One tile as served to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    /// Content type derived from the directory's compression
    pub mime_type: &'static str,

    /// Tile bytes; JPEG tiles already carry their tables
    pub data: Bytes,

    /// Matching tile of the overview's mask directory, if any
    pub mask: Option<Bytes>,
}

impl Tile {
    /// Image bytes followed by the mask bytes, if present.
    pub fn into_bytes(self) -> Bytes {
        match self.mask {
            None => self.data,
            Some(mask) => {
                let mut buf = BytesMut::with_capacity(self.data.len() + mask.len());
                buf.extend_from_slice(&self.data);
                buf.extend_from_slice(&mask);
                buf.freeze()
            }
        }
    }
}

// =============================================================================
// Summary
// =============================================================================

/// Structure overview of a COG, printed by `--info`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CogSummary {
    pub source: String,
    pub version: u16,
    pub byte_order: &'static str,
    pub ifd_count: usize,
    pub overviews: Vec<OverviewSummary>,
}

/// One overview level in a [`CogSummary`].
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OverviewSummary {
    pub overview: usize,
    pub ifd_index: usize,
    pub width: u32,
    pub height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub tiles_x: u32,
    pub tiles_y: u32,
    pub compression: u16,
    pub mime_type: &'static str,
    pub has_jpeg_tables: bool,
    pub has_mask: bool,
}

// =============================================================================
// CogReader
// =============================================================================

/// Decoded file structure, built once per reader.
#[derive(Debug)]
struct CogStructure {
    header: TiffHeader,
    ifd_count: usize,
    pyramid: OverviewPyramid,
}

/// Tile extractor for a single COG.
///
/// The structure is decoded lazily and exactly once; concurrent callers
/// share the result. After that every call is read-only.
pub struct CogReader<R: RangeReader> {
    reader: R,
    structure: OnceCell<CogStructure>,
}

impl<R: RangeReader> CogReader<R> {
    /// Create a reader. No I/O happens until the first query.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            structure: OnceCell::new(),
        }
    }

    /// The underlying range reader.
    pub fn range_reader(&self) -> &R {
        &self.reader
    }

    /// TIFF version: 42 for classic TIFF, 43 for BigTIFF.
    pub async fn version(&self) -> Result<u16, TiffError> {
        Ok(self.structure().await?.header.version())
    }

    /// Byte order declared by the file header.
    pub async fn byte_order(&self) -> Result<ByteOrder, TiffError> {
        Ok(self.structure().await?.header.byte_order)
    }

    /// Number of directories in the chain, masks included.
    pub async fn ifd_count(&self) -> Result<usize, TiffError> {
        Ok(self.structure().await?.ifd_count)
    }

    /// Image and mask descriptors.
    pub async fn pyramid(&self) -> Result<&OverviewPyramid, TiffError> {
        Ok(&self.structure().await?.pyramid)
    }

    /// Fetch tile (x, y) of `overview`.
    ///
    /// JPEG tiles get the directory's tables spliced in and, when the
    /// overview has a mask, the mask tile at the same index attached.
    ///
    /// # Errors
    /// - `OverviewOutOfRange` if the file has no such overview
    /// - `TileOutOfRange` if (x, y) is outside the grid or its index is past
    ///   the end of the offset tables
    pub async fn get_tile(&self, x: u32, y: u32, overview: usize) -> Result<Tile, TiffError> {
        let pyramid = &self.structure().await?.pyramid;

        let image = pyramid
            .image(overview)
            .ok_or(TiffError::OverviewOutOfRange {
                overview,
                count: pyramid.overview_count(),
            })?;

        let (index, offset, byte_count) = image
            .tile_index(x, y)
            .and_then(|index| {
                let (offset, byte_count) = image.tile_location(index)?;
                Some((index, offset, byte_count))
            })
            .ok_or(TiffError::TileOutOfRange { x, y, overview })?;

        debug!(
            source = self.reader.identifier(),
            x,
            y,
            overview,
            index,
            offset,
            byte_count,
            "fetching tile"
        );
        let data = self.read_tile(offset, byte_count).await?;

        if !image.compression.is_jpeg() {
            return Ok(Tile {
                mime_type: image.mime_type(),
                data,
                mask: None,
            });
        }

        let data = insert_tables(data, image.jpeg_tables.as_deref())?;
        let mask = match pyramid.mask(overview) {
            Some(mask) => Some(self.read_mask_tile(mask, index, x, y, overview).await?),
            None => None,
        };

        Ok(Tile {
            mime_type: image.mime_type(),
            data,
            mask,
        })
    }

    /// Structure overview for display.
    pub async fn summary(&self) -> Result<CogSummary, TiffError> {
        let structure = self.structure().await?;
        let pyramid = &structure.pyramid;

        let overviews = pyramid
            .images
            .iter()
            .enumerate()
            .map(|(overview, image)| OverviewSummary {
                overview,
                ifd_index: image.ifd_index,
                width: image.width,
                height: image.height,
                tile_width: image.tile_width,
                tile_height: image.tile_height,
                tiles_x: image.tiles_x,
                tiles_y: image.tiles_y,
                compression: image.compression.code(),
                mime_type: image.mime_type(),
                has_jpeg_tables: image.jpeg_tables.is_some(),
                has_mask: pyramid.mask(overview).is_some(),
            })
            .collect();

        Ok(CogSummary {
            source: self.reader.identifier().to_string(),
            version: structure.header.version(),
            byte_order: structure.header.byte_order.name(),
            ifd_count: structure.ifd_count,
            overviews,
        })
    }

    async fn structure(&self) -> Result<&CogStructure, TiffError> {
        self.structure
            .get_or_try_init(|| async {
                let header = TiffHeader::read(&self.reader).await?;
                let ifds = read_ifd_chain(&self.reader, &header).await?;
                let pyramid = OverviewPyramid::from_ifds(&ifds, header.byte_order)?;

                debug!(
                    source = self.reader.identifier(),
                    version = header.version(),
                    byte_order = header.byte_order.name(),
                    ifds = ifds.len(),
                    overviews = pyramid.overview_count(),
                    masks = pyramid.masks.len(),
                    "decoded COG structure"
                );

                Ok::<_, TiffError>(CogStructure {
                    header,
                    ifd_count: ifds.len(),
                    pyramid,
                })
            })
            .await
    }

    async fn read_mask_tile(
        &self,
        mask: &ImageDescriptor,
        index: usize,
        x: u32,
        y: u32,
        overview: usize,
    ) -> Result<Bytes, TiffError> {
        let (offset, byte_count) = mask
            .tile_location(index)
            .ok_or(TiffError::TileOutOfRange { x, y, overview })?;
        debug!(
            source = self.reader.identifier(),
            overview, index, offset, byte_count, "fetching mask tile"
        );
        self.read_tile(offset, byte_count).await
    }

    async fn read_tile(&self, offset: u64, byte_count: u64) -> Result<Bytes, TiffError> {
        let len = usize::try_from(byte_count).map_err(|_| TiffError::InvalidTagValue {
            tag: "TileByteCounts",
            message: format!("{} does not fit in memory", byte_count),
        })?;
        Ok(self.reader.read_exact_at(offset, len).await?)
    }
}

// =============================================================================
// Tests
// =============================================================================
