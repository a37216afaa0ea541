//! TIFF and BigTIFF structure decoding.
//!
//! # Key Concepts
//!
//! - **Byte order**: TIFF files declare their endianness (II = little-endian, MM = big-endian)
//!   in the header. All multi-byte values must be read respecting this order.
//!
//! - **Classic TIFF vs BigTIFF**: Classic TIFF uses 32-bit offsets and counts, BigTIFF
//!   uses 64-bit ones. The header records which, and every later read follows it.
//!
//! - **IFD (Image File Directory)**: A list of tagged entries plus a link to the next
//!   directory. A COG holds one IFD per overview, optionally followed by mask IFDs.
//!
//! - **Inline vs offset values**: Small values are stored inline in the IFD entry,
//!   larger values are stored at an offset pointed to by the entry.

mod ifd;
mod image;
mod parser;
mod pyramid;
mod tags;
mod values;

pub use ifd::{read_ifd_chain, Ifd, Tag, MAX_IFDS};
pub use image::ImageDescriptor;
pub use parser::{ByteOrder, TiffHeader, VERSION_BIGTIFF, VERSION_TIFF};
pub use pyramid::OverviewPyramid;
pub use tags::{
    Compression, FieldType, TiffTag, MIME_DEFLATE, MIME_JP2, MIME_JPEG, MIME_OCTET_STREAM,
};
pub use values::{parse_first_u64, parse_u64_array};
