use std::io::SeekFrom;
use std::path::Path;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::Mutex;

use super::range_reader::{check_bounds, RangeReader};
use crate::error::IoError;

/// Local-file implementation of RangeReader.
///
/// The file handle is shared behind a mutex so each seek + read pair is
/// atomic with respect to concurrent readers.
#[derive(Debug)]
pub struct FileRangeReader {
    file: Mutex<File>,
    size: u64,
    identifier: String,
}

impl FileRangeReader {
    /// Open the file at `path`.
    ///
    /// Returns `IoError::NotFound` if the path does not exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let path = path.as_ref();
        let file = File::open(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => IoError::NotFound(path.display().to_string()),
            _ => IoError::Local(format!("{}: {}", path.display(), e)),
        })?;

        let size = file
            .metadata()
            .await
            .map_err(|e| IoError::Local(e.to_string()))?
            .len();

        Ok(Self {
            file: Mutex::new(file),
            size,
            identifier: format!("file://{}", path.display()),
        })
    }

    /// Size of the file in bytes, captured at open time.
    pub fn size(&self) -> u64 {
        self.size
    }
}

#[async_trait]
impl RangeReader for FileRangeReader {
    async fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        check_bounds(offset, len, self.size)?;

        if len == 0 {
            return Ok(Bytes::new());
        }

        let mut buf = BytesMut::zeroed(len);
        let mut file = self.file.lock().await;
        file.seek(SeekFrom::Start(offset))
            .await
            .map_err(|e| IoError::Local(e.to_string()))?;
        file.read_exact(&mut buf).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::UnexpectedEof => IoError::ShortRead {
                offset,
                expected: len,
                actual: 0,
            },
            _ => IoError::Local(e.to_string()),
        })?;

        Ok(buf.freeze())
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}
