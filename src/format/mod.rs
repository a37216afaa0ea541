//! Cloud Optimized GeoTIFF decoding.
//!
//! - [`tiff`] decodes the header and the directory chain into an overview pyramid
//! - [`jpeg`] restores shared tables into abbreviated JPEG tiles
//! - [`cog`] ties both together behind [`CogReader`]

pub mod cog;
pub mod jpeg;
pub mod tiff;

pub use cog::{CogReader, CogSummary, OverviewSummary, Tile};
pub use jpeg::insert_tables;
