//! Output naming and writing for extracted tiles.

use std::path::{Path, PathBuf};

use crate::format::tiff::{MIME_DEFLATE, MIME_JP2, MIME_JPEG};

/// File extension (with leading dot) for a tile MIME type.
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        MIME_JPEG => ".jpg",
        MIME_JP2 => ".jp2",
        MIME_DEFLATE => ".zz",
        _ => ".bin",
    }
}

/// Default output file name: `<prefix>_<x>_<y>_<z><ext>`.
pub fn default_output_name(prefix: &str, x: u32, y: u32, z: u32, mime_type: &str) -> PathBuf {
    PathBuf::from(format!(
        "{}_{}_{}_{}{}",
        prefix,
        x,
        y,
        z,
        extension_for_mime(mime_type)
    ))
}

/// Write `data` to `path`, replacing any existing file.
pub async fn write_tile(path: &Path, data: &[u8]) -> std::io::Result<()> {
    tokio::fs::write(path, data).await
}
