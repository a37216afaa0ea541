//! # cog-dumper
//!
//! Extract individual tiles from Cloud Optimized GeoTIFFs (COGs) without
//! downloading the whole file.
//!
//! A COG keeps its directory metadata at the front of the file and stores
//! image data in independently addressable tiles. This library reads only
//! the TIFF header, the directory chain and the bytes of the requested tile,
//! over any byte-range source: a local file, an HTTP server or S3.
//!
//! ## Features
//!
//! - **Classic TIFF and BigTIFF**, little- and big-endian
//! - **Overview pyramids** with GDAL-style internal masks
//! - **JPEG table reinsertion**: JPEG tiles are returned as standalone,
//!   decodable streams
//! - **Pluggable transports** through the [`RangeReader`] trait
//!
//! ## Architecture
//!
//! - [`io`] - Range readers for files, HTTP, S3 and memory
//! - [`mod@format`] - TIFF structure decoding, JPEG fixup and [`CogReader`]
//! - [`config`] - CLI types
//! - [`output`] - Output file naming
//!
//! ## Example
//!
//! ```rust,no_run
//! use cog_dumper::{CogReader, MemoryRangeReader};
//!
//! # async fn run(bytes: Vec<u8>) -> Result<(), cog_dumper::TiffError> {
//! let cog = CogReader::new(MemoryRangeReader::new(bytes, "cog.tif"));
//!
//! println!("TIFF version {}", cog.version().await?);
//! let tile = cog.get_tile(0, 0, 0).await?;
//! assert_eq!(tile.mime_type, "image/jpeg");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod io;
pub mod output;

// Re-export commonly used types
pub use config::{Cli, Command, FileArgs, HttpArgs, S3Args, TileArgs};
pub use error::{IoError, JpegError, TiffError};
pub use format::tiff::{
    read_ifd_chain, ByteOrder, Compression, FieldType, Ifd, ImageDescriptor, OverviewPyramid,
    Tag, TiffHeader, TiffTag, MAX_IFDS,
};
pub use format::{insert_tables, CogReader, CogSummary, OverviewSummary, Tile};
pub use io::{
    build_url, create_s3_client, range_header, BasicAuth, FileRangeReader, HttpRangeReader,
    MemoryRangeReader, RangeReader, S3RangeReader,
};
