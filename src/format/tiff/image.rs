//! Image descriptors: the tile grid of one directory.

use bytes::Bytes;
use tracing::warn;

use crate::error::TiffError;

use super::ifd::Ifd;
use super::parser::ByteOrder;
use super::tags::{Compression, TiffTag};

// =============================================================================
// ImageDescriptor
// =============================================================================

/// Everything needed to locate and label the tiles of one directory.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageDescriptor {
    /// Index of the source IFD in the file's IFD chain
    pub ifd_index: usize,

    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Tile width in pixels
    pub tile_width: u32,

    /// Tile height in pixels
    pub tile_height: u32,

    /// Compression scheme (JPEG when the tag is absent)
    pub compression: Compression,

    /// Absolute offset of each tile, row-major
    pub tile_offsets: Vec<u64>,

    /// Byte count of each tile, row-major
    pub tile_byte_counts: Vec<u64>,

    /// Shared JPEG tables, if the directory has them
    pub jpeg_tables: Option<Bytes>,

    /// Number of tiles in X direction
    pub tiles_x: u32,

    /// Number of tiles in Y direction
    pub tiles_y: u32,
}

impl ImageDescriptor {
    /// Build the descriptor for the IFD at `ifd_index`.
    ///
    /// # Errors
    /// - `MissingTileOffsets` if the directory has no TileOffsets tag
    /// - `InvalidTagValue` if a dimension is missing, zero (tile sizes) or
    ///   not an unsigned integer
    pub fn from_ifd(ifd: &Ifd, ifd_index: usize, byte_order: ByteOrder) -> Result<Self, TiffError> {
        let width = required_u32(ifd, TiffTag::ImageWidth, byte_order)?;
        let height = required_u32(ifd, TiffTag::ImageLength, byte_order)?;
        let tile_width = tile_dimension(ifd, TiffTag::TileWidth, byte_order)?;
        let tile_height = tile_dimension(ifd, TiffTag::TileLength, byte_order)?;

        let compression = match ifd.get(TiffTag::Compression) {
            Some(tag) => {
                let code = tag.first_u64(byte_order)?;
                let code = u16::try_from(code).map_err(|_| TiffError::InvalidTagValue {
                    tag: TiffTag::Compression.name(),
                    message: format!("{} does not fit a compression code", code),
                })?;
                Compression::from_u16(code)
            }
            None => Compression::default(),
        };

        let tile_offsets = ifd
            .get(TiffTag::TileOffsets)
            .ok_or(TiffError::MissingTileOffsets { ifd_index })?
            .u64_values(byte_order)?;

        let tile_byte_counts = match ifd.get(TiffTag::TileByteCounts) {
            Some(tag) => tag.u64_values(byte_order)?,
            None => Vec::new(),
        };

        let jpeg_tables = ifd.get(TiffTag::JpegTables).map(|tag| tag.data.clone());

        let tiles_x = width.div_ceil(tile_width);
        let tiles_y = height.div_ceil(tile_height);

        let expected = tiles_x as u64 * tiles_y as u64;
        if tile_offsets.len() as u64 != expected || tile_byte_counts.len() != tile_offsets.len() {
            warn!(
                ifd_index,
                tiles_x,
                tiles_y,
                offsets = tile_offsets.len(),
                byte_counts = tile_byte_counts.len(),
                "tile offset table does not match the tile grid"
            );
        }

        Ok(ImageDescriptor {
            ifd_index,
            width,
            height,
            tile_width,
            tile_height,
            compression,
            tile_offsets,
            tile_byte_counts,
            jpeg_tables,
            tiles_x,
            tiles_y,
        })
    }

    /// Content type of this directory's tiles.
    #[inline]
    pub fn mime_type(&self) -> &'static str {
        self.compression.mime_type()
    }

    /// Whether this directory holds a validity mask.
    #[inline]
    pub fn is_mask(&self) -> bool {
        self.compression.is_mask()
    }

    /// Number of tiles in the grid.
    pub fn tile_count(&self) -> u64 {
        self.tiles_x as u64 * self.tiles_y as u64
    }

    /// Row-major index of tile (x, y), or `None` outside the grid.
    pub fn tile_index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.tiles_x || y >= self.tiles_y {
            return None;
        }
        let index = y as u64 * self.tiles_x as u64 + x as u64;
        usize::try_from(index).ok()
    }

    /// Offset and byte count of the tile at `index`, or `None` when either
    /// table is too short.
    pub fn tile_location(&self, index: usize) -> Option<(u64, u64)> {
        let offset = *self.tile_offsets.get(index)?;
        let byte_count = *self.tile_byte_counts.get(index)?;
        Some((offset, byte_count))
    }
}

fn required_u32(ifd: &Ifd, tag: TiffTag, byte_order: ByteOrder) -> Result<u32, TiffError> {
    let value = ifd
        .get(tag)
        .ok_or_else(|| TiffError::InvalidTagValue {
            tag: tag.name(),
            message: "missing".to_string(),
        })?
        .first_u64(byte_order)?;

    u32::try_from(value).map_err(|_| TiffError::InvalidTagValue {
        tag: tag.name(),
        message: format!("{} exceeds 32 bits", value),
    })
}

fn tile_dimension(ifd: &Ifd, tag: TiffTag, byte_order: ByteOrder) -> Result<u32, TiffError> {
    let value = required_u32(ifd, tag, byte_order)?;
    if value == 0 {
        return Err(TiffError::InvalidTagValue {
            tag: tag.name(),
            message: "tile dimension is zero".to_string(),
        });
    }
    Ok(value)
}

// =============================================================================
// Tests
// =============================================================================
