use async_trait::async_trait;
use bytes::Bytes;

use super::range_reader::{check_bounds, RangeReader};
use crate::error::IoError;

/// RangeReader over a buffer that is already in memory.
///
/// Reads are zero-copy slices of the underlying `Bytes`.
#[derive(Debug, Clone)]
pub struct MemoryRangeReader {
    data: Bytes,
    identifier: String,
}

impl MemoryRangeReader {
    /// Wrap `data`, labelled `mem://<name>` in logs.
    pub fn new(data: impl Into<Bytes>, name: &str) -> Self {
        Self {
            data: data.into(),
            identifier: format!("mem://{}", name),
        }
    }

    /// Total size of the buffer in bytes.
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[async_trait]
impl RangeReader for MemoryRangeReader {
    async fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        check_bounds(offset, len, self.len())?;
        let start = offset as usize;
        Ok(self.data.slice(start..start + len))
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}
