//! TIFF header parsing.
//!
//! The header fixes the byte order and word size used by every later read.
//!
//! # TIFF Header Structure
//!
//! ## Classic TIFF (8 bytes)
//! ```text
//! Bytes 0-1: Byte order ("II" = little-endian, "MM" = big-endian)
//! Bytes 2-3: Version (42)
//! Bytes 4-7: Offset to first IFD (4 bytes)
//! ```
//!
//! ## BigTIFF (16 bytes)
//! ```text
//! Bytes 0-1: Byte order ("II" = little-endian, "MM" = big-endian)
//! Bytes 2-3: Version (43)
//! Bytes 4-5: Offset byte size (must be 8)
//! Bytes 6-7: Reserved (must be 0)
//! Bytes 8-15: Offset to first IFD (8 bytes)
//! ```

use crate::error::TiffError;
use crate::io::RangeReader;

// =============================================================================
// Constants
// =============================================================================

/// "II" read as a little-endian u16
const BYTE_ORDER_LITTLE_ENDIAN: u16 = 0x4949;

/// "MM" read as a little-endian u16
const BYTE_ORDER_BIG_ENDIAN: u16 = 0x4D4D;

/// Version number for classic TIFF
pub const VERSION_TIFF: u16 = 42;

/// Version number for BigTIFF
pub const VERSION_BIGTIFF: u16 = 43;

/// Bytes read to learn byte order and version
const HEADER_PREFIX_SIZE: usize = 4;

/// Bytes following the prefix in a classic TIFF header
const TIFF_HEADER_REST: usize = 4;

/// Bytes following the prefix in a BigTIFF header
const BIGTIFF_HEADER_REST: usize = 12;

// =============================================================================
// ByteOrder
// =============================================================================

/// Byte order (endianness) of a TIFF file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian ("II" = Intel)
    LittleEndian,
    /// Big-endian ("MM" = Motorola)
    BigEndian,
}

impl ByteOrder {
    /// Read a u16 from the first 2 bytes of `bytes`.
    ///
    /// # Panics
    /// Panics if the slice has fewer than 2 bytes.
    #[inline]
    pub fn read_u16(self, bytes: &[u8]) -> u16 {
        let raw = [bytes[0], bytes[1]];
        match self {
            ByteOrder::LittleEndian => u16::from_le_bytes(raw),
            ByteOrder::BigEndian => u16::from_be_bytes(raw),
        }
    }

    /// Read a u32 from the first 4 bytes of `bytes`.
    ///
    /// # Panics
    /// Panics if the slice has fewer than 4 bytes.
    #[inline]
    pub fn read_u32(self, bytes: &[u8]) -> u32 {
        let raw = [bytes[0], bytes[1], bytes[2], bytes[3]];
        match self {
            ByteOrder::LittleEndian => u32::from_le_bytes(raw),
            ByteOrder::BigEndian => u32::from_be_bytes(raw),
        }
    }

    /// Read a u64 from the first 8 bytes of `bytes`.
    ///
    /// # Panics
    /// Panics if the slice has fewer than 8 bytes.
    #[inline]
    pub fn read_u64(self, bytes: &[u8]) -> u64 {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&bytes[..8]);
        match self {
            ByteOrder::LittleEndian => u64::from_le_bytes(raw),
            ByteOrder::BigEndian => u64::from_be_bytes(raw),
        }
    }

    /// Human-readable name, as shown in summaries.
    pub const fn name(self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "little-endian",
            ByteOrder::BigEndian => "big-endian",
        }
    }
}

// =============================================================================
// TiffHeader
// =============================================================================

/// Parsed TIFF file header.
///
/// Fixed for the lifetime of a decode session: byte order, word mode
/// (classic vs BigTIFF) and where the directory chain starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiffHeader {
    /// Byte order for all multi-byte values in the file
    pub byte_order: ByteOrder,

    /// Whether this is a BigTIFF file (64-bit offsets and counts)
    pub is_bigtiff: bool,

    /// Offset to the first IFD in the file
    pub first_ifd_offset: u64,
}

impl TiffHeader {
    /// Read and validate the header from the start of `reader`.
    ///
    /// Issues two reads: the 4-byte prefix, then the 4-byte (classic) or
    /// 12-byte (BigTIFF) remainder.
    ///
    /// # Errors
    /// - `InvalidMagic` if byte order bytes are not II or MM
    /// - `InvalidVersion` if version is not 42 or 43
    /// - `InvalidBigTiffOffsetSize` / `InvalidBigTiffReserved` for a
    ///   malformed BigTIFF extension
    pub async fn read<R: RangeReader + ?Sized>(reader: &R) -> Result<Self, TiffError> {
        let prefix = reader.read_exact_at(0, HEADER_PREFIX_SIZE).await?;
        let (byte_order, version) = parse_prefix(&prefix)?;

        let rest_len = match version {
            VERSION_TIFF => TIFF_HEADER_REST,
            VERSION_BIGTIFF => BIGTIFF_HEADER_REST,
            _ => return Err(TiffError::InvalidVersion(version)),
        };
        let rest = reader
            .read_exact_at(HEADER_PREFIX_SIZE as u64, rest_len)
            .await?;

        Self::from_parts(byte_order, version, &rest)
    }

    /// Build the header from the bytes following the 4-byte prefix.
    fn from_parts(byte_order: ByteOrder, version: u16, rest: &[u8]) -> Result<Self, TiffError> {
        match version {
            VERSION_TIFF => Ok(TiffHeader {
                byte_order,
                is_bigtiff: false,
                first_ifd_offset: byte_order.read_u32(&rest[0..4]) as u64,
            }),
            VERSION_BIGTIFF => {
                let offset_size = byte_order.read_u16(&rest[0..2]);
                if offset_size != 8 {
                    return Err(TiffError::InvalidBigTiffOffsetSize(offset_size));
                }

                let reserved = byte_order.read_u16(&rest[2..4]);
                if reserved != 0 {
                    return Err(TiffError::InvalidBigTiffReserved(reserved));
                }

                Ok(TiffHeader {
                    byte_order,
                    is_bigtiff: true,
                    first_ifd_offset: byte_order.read_u64(&rest[4..12]),
                })
            }
            _ => Err(TiffError::InvalidVersion(version)),
        }
    }

    /// TIFF version number: 42 for classic TIFF, 43 for BigTIFF.
    #[inline]
    pub const fn version(&self) -> u16 {
        if self.is_bigtiff {
            VERSION_BIGTIFF
        } else {
            VERSION_TIFF
        }
    }

    /// Size of an IFD entry in bytes.
    ///
    /// Classic TIFF: 12 bytes (2 tag + 2 type + 4 count + 4 value/offset)
    /// BigTIFF: 20 bytes (2 tag + 2 type + 8 count + 8 value/offset)
    #[inline]
    pub const fn ifd_entry_size(&self) -> usize {
        if self.is_bigtiff {
            20
        } else {
            12
        }
    }

    /// Size of the entry count field at the start of an IFD.
    #[inline]
    pub const fn ifd_count_size(&self) -> usize {
        if self.is_bigtiff {
            8
        } else {
            2
        }
    }

    /// Size of offsets and value counts: the next-IFD link, the count field
    /// of an entry and its value/offset slot all share this width.
    #[inline]
    pub const fn offset_size(&self) -> usize {
        if self.is_bigtiff {
            8
        } else {
            4
        }
    }

    /// Read an offset-sized word (4 or 8 bytes) from `bytes`.
    #[inline]
    pub fn read_offset(&self, bytes: &[u8]) -> u64 {
        if self.is_bigtiff {
            self.byte_order.read_u64(bytes)
        } else {
            self.byte_order.read_u32(bytes) as u64
        }
    }

    /// Read an IFD entry count (2 or 8 bytes) from `bytes`.
    #[inline]
    pub fn read_entry_count(&self, bytes: &[u8]) -> u64 {
        if self.is_bigtiff {
            self.byte_order.read_u64(bytes)
        } else {
            self.byte_order.read_u16(bytes) as u64
        }
    }
}

/// Decode byte order and version from the first 4 bytes of a file.
fn parse_prefix(bytes: &[u8]) -> Result<(ByteOrder, u16), TiffError> {
    // Read as little-endian because we're matching fixed byte patterns
    let magic = u16::from_le_bytes([bytes[0], bytes[1]]);
    let byte_order = match magic {
        BYTE_ORDER_LITTLE_ENDIAN => ByteOrder::LittleEndian,
        BYTE_ORDER_BIG_ENDIAN => ByteOrder::BigEndian,
        _ => return Err(TiffError::InvalidMagic(magic)),
    };

    Ok((byte_order, byte_order.read_u16(&bytes[2..4])))
}

// =============================================================================
// Tests
// =============================================================================
