//! JPEG table reinsertion.
//!
//! # Abbreviated JPEG Streams
//!
//! Tiled TIFFs with JPEG compression usually store the quantization (DQT)
//! and Huffman (DHT) tables once, in the directory's `JPEGTables` tag, and
//! each tile as an abbreviated stream without them. Such a tile cannot be
//! decoded on its own.
//!
//! # Merging
//!
//! `JPEGTables` is itself a tiny JPEG stream: SOI, the table segments, EOI.
//! Dropping its SOI and EOI and splicing the rest directly after the tile's
//! SOI yields a self-contained stream:
//!
//! ```text
//! tile[0..2] + tables[2..len-2] + tile[2..]
//! ```

use bytes::{Bytes, BytesMut};

use crate::error::JpegError;

// =============================================================================
// JPEG Markers
// =============================================================================

/// Start Of Image marker
pub const SOI: [u8; 2] = [0xFF, 0xD8];

// =============================================================================
// Table Insertion
// =============================================================================

/// Splice the shared `JPEGTables` segments into a tile.
///
/// Returns the tile unchanged when `tables` is `None` or empty. The output
/// is always `tile.len() + tables.len() - 4` bytes otherwise.
///
/// # Errors
/// - `MissingSoi` if the tile does not start with FF D8
/// - `TablesTooShort` if the tables cannot hold both SOI and EOI
pub fn insert_tables(tile: Bytes, tables: Option<&[u8]>) -> Result<Bytes, JpegError> {
    let tables = match tables {
        Some(tables) if !tables.is_empty() => tables,
        _ => return Ok(tile),
    };

    if tile.len() < 2 || tile[0..2] != SOI {
        return Err(JpegError::MissingSoi);
    }
    if tables.len() < 4 {
        return Err(JpegError::TablesTooShort(tables.len()));
    }

    let mut result = BytesMut::with_capacity(tile.len() + tables.len() - 4);
    result.extend_from_slice(&tile[..2]);
    result.extend_from_slice(&tables[2..tables.len() - 2]);
    result.extend_from_slice(&tile[2..]);

    Ok(result.freeze())
}

// =============================================================================
// Tests
// =============================================================================
