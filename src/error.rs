use thiserror::Error;

/// Errors raised by byte-range transports.
///
/// The decoder never interprets these; it wraps them in [`TiffError::Io`]
/// and hands them back to the caller, which decides whether to retry.
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// Local filesystem error
    #[error("Local I/O error: {0}")]
    Local(String),

    /// HTTP transport error (request could not be sent or body not received)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Server answered a range request with something other than 206
    #[error("HTTP byte range {offset}+{len} not available (status {status})")]
    HttpStatus { status: u16, offset: u64, len: usize },

    /// Error from S3 or S3-compatible storage
    #[error("S3 error: {0}")]
    S3(String),

    /// Network or connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Resource does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Requested range exceeds resource bounds
    #[error("Range out of bounds: requested {requested} bytes at offset {offset}, size is {size}")]
    RangeOutOfBounds {
        offset: u64,
        requested: u64,
        size: u64,
    },

    /// Transport returned fewer bytes than requested
    #[error("Short read at offset {offset}: expected {expected} bytes, got {actual}")]
    ShortRead {
        offset: u64,
        expected: usize,
        actual: usize,
    },
}

/// Errors raised while splicing JPEG tables into a tile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JpegError {
    /// Tile does not begin with the Start-Of-Image marker
    #[error("Missing SOI marker for JPEG tile")]
    MissingSoi,

    /// JPEGTables blob cannot hold its own SOI and EOI markers
    #[error("JPEGTables too short: {0} bytes")]
    TablesTooShort(usize),
}

/// Errors that can occur when decoding a (Big)TIFF or resolving a tile.
///
/// Every variant except [`TiffError::Io`] describes a malformed or
/// unsupported structure. `Io` carries a transport failure unchanged.
#[derive(Debug, Clone, Error)]
pub enum TiffError {
    /// I/O error while reading the file
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Invalid TIFF magic bytes (not II or MM)
    #[error("Invalid TIFF magic bytes: expected 0x4949 (II) or 0x4D4D (MM), got 0x{0:04X}")]
    InvalidMagic(u16),

    /// Invalid TIFF version number
    #[error("Invalid version {0} for TIFF file")]
    InvalidVersion(u16),

    /// Invalid BigTIFF offset byte size (must be 8)
    #[error("Invalid BigTIFF offset byte size: expected 8, got {0}")]
    InvalidBigTiffOffsetSize(u16),

    /// Invalid BigTIFF reserved word (must be 0)
    #[error("Invalid BigTIFF reserved word: expected 0, got {0}")]
    InvalidBigTiffReserved(u16),

    /// Recognized tag declared with a data type we cannot size
    #[error("Unrecognised data type {field_type} for tag {tag}")]
    UnknownFieldType { tag: u16, field_type: u16 },

    /// Tag has unexpected type, count or value
    #[error("Invalid tag value for {tag}: {message}")]
    InvalidTagValue { tag: &'static str, message: String },

    /// Directory cannot serve tiles
    #[error("TIFF tiles are not found in IFD {ifd_index}")]
    MissingTileOffsets { ifd_index: usize },

    /// Requested overview level does not exist
    #[error("Overview {overview} is out of bounds ({count} overviews available)")]
    OverviewOutOfRange { overview: usize, count: usize },

    /// Requested tile does not exist in the overview's grid
    #[error("Tile {x} {y} {overview} does not exist")]
    TileOutOfRange { x: u32, y: u32, overview: usize },

    /// Directory chain is longer than the walker accepts
    #[error("IFD chain exceeds {0} directories")]
    TooManyIfds(usize),

    /// Directory chain points back at an already parsed IFD
    #[error("IFD chain revisits offset {0}")]
    IfdCycle(u64),

    /// JPEG table fixup failed
    #[error("JPEG error: {0}")]
    Jpeg(#[from] JpegError),
}

impl TiffError {
    /// Whether this error came from the byte-range transport rather than
    /// from the file's structure.
    pub fn is_transport(&self) -> bool {
        matches!(self, TiffError::Io(_))
    }
}
