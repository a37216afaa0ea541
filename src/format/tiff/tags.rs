//! TIFF tag, field type and compression tables.
//!
//! These are the only static tables the decoder consults:
//! - which tag codes are decoded (everything else is skipped)
//! - how many bytes one element of each data type occupies
//! - which MIME type a compression code maps to

// =============================================================================
// MIME Types
// =============================================================================

/// JPEG tiles (compression 6 and 7)
pub const MIME_JPEG: &str = "image/jpeg";

/// JPEG 2000 tiles (compression 34712)
pub const MIME_JP2: &str = "image/jp2";

/// zlib/deflate tiles (compression 8), used for COG validity masks.
///
/// Some COG tools report these tiles as plain `deflate`; this crate uses
/// the registered `application/zlib` type instead.
pub const MIME_DEFLATE: &str = "application/zlib";

/// Fallback for any compression code without a dedicated MIME type
pub const MIME_OCTET_STREAM: &str = "application/octet-stream";

// =============================================================================
// TIFF Field Types
// =============================================================================

/// TIFF field types the decoder knows how to size.
///
/// A recognized tag declared with any other type code is a format error,
/// because its value length (and so its inline/offset placement) cannot be
/// computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum FieldType {
    /// Unsigned 8-bit integer
    Byte = 1,

    /// 8-bit ASCII character
    Ascii = 2,

    /// Unsigned 16-bit integer
    Short = 3,

    /// Unsigned 32-bit integer
    Long = 4,

    /// Two Longs: numerator and denominator
    Rational = 5,

    /// Opaque byte
    Undefined = 7,

    /// IEEE 64-bit float
    Double = 12,

    /// Unsigned 64-bit integer (BigTIFF)
    Long8 = 16,
}

impl FieldType {
    /// Size of a single element of this type in bytes.
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            FieldType::Byte | FieldType::Ascii | FieldType::Undefined => 1,
            FieldType::Short => 2,
            FieldType::Long => 4,
            FieldType::Rational | FieldType::Double | FieldType::Long8 => 8,
        }
    }

    /// Returns `None` for type codes outside the table.
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(FieldType::Byte),
            2 => Some(FieldType::Ascii),
            3 => Some(FieldType::Short),
            4 => Some(FieldType::Long),
            5 => Some(FieldType::Rational),
            7 => Some(FieldType::Undefined),
            12 => Some(FieldType::Double),
            16 => Some(FieldType::Long8),
            _ => None,
        }
    }

    /// Whether values of this type are unsigned integers.
    #[inline]
    pub const fn is_unsigned_integer(self) -> bool {
        matches!(
            self,
            FieldType::Byte | FieldType::Short | FieldType::Long | FieldType::Long8
        )
    }
}

// =============================================================================
// TIFF Tags
// =============================================================================

/// Tags needed to locate tiles.
///
/// Tags not listed here are skipped during directory parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TiffTag {
    /// Image width in pixels
    ImageWidth = 256,

    /// Image height (length) in pixels
    ImageLength = 257,

    /// Compression scheme
    Compression = 259,

    /// Width of each tile in pixels
    TileWidth = 322,

    /// Height (length) of each tile in pixels
    TileLength = 323,

    /// Byte offset of each tile in the file
    TileOffsets = 324,

    /// Byte count of each tile
    TileByteCounts = 325,

    /// Quantization and Huffman tables shared by every tile of a directory
    JpegTables = 347,
}

impl TiffTag {
    /// Returns `None` for tags the decoder does not need.
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            256 => Some(TiffTag::ImageWidth),
            257 => Some(TiffTag::ImageLength),
            259 => Some(TiffTag::Compression),
            322 => Some(TiffTag::TileWidth),
            323 => Some(TiffTag::TileLength),
            324 => Some(TiffTag::TileOffsets),
            325 => Some(TiffTag::TileByteCounts),
            347 => Some(TiffTag::JpegTables),
            _ => None,
        }
    }

    /// Tag name as used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            TiffTag::ImageWidth => "ImageWidth",
            TiffTag::ImageLength => "ImageLength",
            TiffTag::Compression => "Compression",
            TiffTag::TileWidth => "TileWidth",
            TiffTag::TileLength => "TileLength",
            TiffTag::TileOffsets => "TileOffsets",
            TiffTag::TileByteCounts => "TileByteCounts",
            TiffTag::JpegTables => "JPEGTables",
        }
    }
}

// =============================================================================
// Compression Values
// =============================================================================

/// TIFF compression scheme of a directory.
///
/// Never fails to decode: codes without a dedicated entry become `Other`
/// and are served as opaque bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// "Old-style" JPEG (6)
    OldJpeg,

    /// JPEG (7)
    Jpeg,

    /// Deflate/zlib (8), the codec of COG mask directories
    Deflate,

    /// JPEG 2000 (34712)
    Jpeg2000,

    /// Anything else
    Other(u16),
}

impl Compression {
    pub const fn from_u16(value: u16) -> Self {
        match value {
            6 => Compression::OldJpeg,
            7 => Compression::Jpeg,
            8 => Compression::Deflate,
            34712 => Compression::Jpeg2000,
            other => Compression::Other(other),
        }
    }

    /// Numeric compression code as stored in the file.
    pub const fn code(self) -> u16 {
        match self {
            Compression::OldJpeg => 6,
            Compression::Jpeg => 7,
            Compression::Deflate => 8,
            Compression::Jpeg2000 => 34712,
            Compression::Other(code) => code,
        }
    }

    /// Content type of tiles compressed with this scheme.
    pub const fn mime_type(self) -> &'static str {
        match self {
            Compression::OldJpeg | Compression::Jpeg => MIME_JPEG,
            Compression::Deflate => MIME_DEFLATE,
            Compression::Jpeg2000 => MIME_JP2,
            Compression::Other(_) => MIME_OCTET_STREAM,
        }
    }

    #[inline]
    pub const fn is_jpeg(self) -> bool {
        matches!(self, Compression::OldJpeg | Compression::Jpeg)
    }

    /// Directories compressed with deflate hold validity masks.
    #[inline]
    pub const fn is_mask(self) -> bool {
        matches!(self, Compression::Deflate)
    }
}

impl Default for Compression {
    /// Directories without a Compression tag are treated as JPEG.
    fn default() -> Self {
        Compression::Jpeg
    }
}

// =============================================================================
// Tests
// =============================================================================
