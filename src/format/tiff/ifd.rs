//! IFD (Image File Directory) parsing and chain walking.
//!
//! # IFD Layout
//!
//! ```text
//! Classic TIFF                      BigTIFF
//! 2 bytes   entry count             8 bytes   entry count
//! 12 bytes  per entry               20 bytes  per entry
//!   2  tag                            2  tag
//!   2  field type                     2  field type
//!   4  value count                    8  value count
//!   4  value or offset                8  value or offset
//! 4 bytes   next IFD offset         8 bytes   next IFD offset
//! ```
//!
//! A value whose total size fits the value slot is stored inline; otherwise
//! the slot holds the absolute offset of the value.

use std::collections::HashSet;

use bytes::Bytes;
use tracing::debug;

use crate::error::TiffError;
use crate::io::RangeReader;

use super::parser::{ByteOrder, TiffHeader};
use super::tags::{FieldType, TiffTag};
use super::values::{parse_first_u64, parse_u64_array};

/// Upper bound on the number of directories in one file.
pub const MAX_IFDS: usize = 1024;

// =============================================================================
// Tag
// =============================================================================

/// A decoded IFD entry for one of the recognized tags.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub tag: TiffTag,
    pub field_type: FieldType,
    /// Number of elements (not bytes)
    pub count: u64,
    /// Raw value bytes, `count * field_type.size_in_bytes()` long
    pub data: Bytes,
}

impl Tag {
    /// Decode all elements as unsigned integers.
    pub fn u64_values(&self, byte_order: ByteOrder) -> Result<Vec<u64>, TiffError> {
        let count = usize::try_from(self.count).map_err(|_| self.invalid("count too large"))?;
        parse_u64_array(&self.data, count, self.field_type, byte_order)
            .ok_or_else(|| self.invalid(&format!("expected integers, got {:?}", self.field_type)))
    }

    /// Decode the first element as an unsigned integer.
    pub fn first_u64(&self, byte_order: ByteOrder) -> Result<u64, TiffError> {
        parse_first_u64(&self.data, self.field_type, byte_order).ok_or_else(|| {
            self.invalid(&format!(
                "expected at least one integer, got {} x {:?}",
                self.count, self.field_type
            ))
        })
    }

    fn invalid(&self, message: &str) -> TiffError {
        TiffError::InvalidTagValue {
            tag: self.tag.name(),
            message: message.to_string(),
        }
    }
}

// =============================================================================
// Ifd
// =============================================================================

/// One parsed Image File Directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Ifd {
    /// Offset of this IFD in the file
    pub offset: u64,

    /// Recognized tags in file order
    pub tags: Vec<Tag>,

    /// Offset of the next IFD (0 terminates the chain)
    pub next_ifd_offset: u64,
}

impl Ifd {
    /// Parse the IFD at `offset`.
    ///
    /// Reads the entry count, then the whole entry table in one request,
    /// then the next-IFD link. Entries whose values live elsewhere in the
    /// file cost one extra read each; unrecognized tags cost nothing.
    pub async fn read<R: RangeReader + ?Sized>(
        reader: &R,
        header: &TiffHeader,
        offset: u64,
    ) -> Result<Self, TiffError> {
        let count_size = header.ifd_count_size();
        let count_bytes = reader.read_exact_at(offset, count_size).await?;
        let entry_count = header.read_entry_count(&count_bytes);

        let entry_size = header.ifd_entry_size();
        let table_len = entry_count
            .checked_mul(entry_size as u64)
            .and_then(|len| usize::try_from(len).ok())
            .ok_or_else(|| TiffError::InvalidTagValue {
                tag: "IFD",
                message: format!("entry count {} at offset {} is too large", entry_count, offset),
            })?;

        let table_offset = offset + count_size as u64;
        let table = if table_len == 0 {
            Bytes::new()
        } else {
            reader.read_exact_at(table_offset, table_len).await?
        };

        let mut tags = Vec::new();
        for start in (0..table_len).step_by(entry_size) {
            let entry = table.slice(start..start + entry_size);
            if let Some(tag) = read_entry(reader, header, &entry).await? {
                tags.push(tag);
            }
        }

        let next_bytes = reader
            .read_exact_at(table_offset + table_len as u64, header.offset_size())
            .await?;
        let next_ifd_offset = header.read_offset(&next_bytes);

        Ok(Ifd {
            offset,
            tags,
            next_ifd_offset,
        })
    }

    /// Get a tag by ID.
    pub fn get(&self, tag: TiffTag) -> Option<&Tag> {
        self.tags.iter().find(|t| t.tag == tag)
    }
}

/// Decode one IFD entry. Returns `None` for unrecognized tags.
async fn read_entry<R: RangeReader + ?Sized>(
    reader: &R,
    header: &TiffHeader,
    entry: &Bytes,
) -> Result<Option<Tag>, TiffError> {
    let byte_order = header.byte_order;

    let code = byte_order.read_u16(&entry[0..2]);
    let Some(tag) = TiffTag::from_u16(code) else {
        return Ok(None);
    };

    let field_type_raw = byte_order.read_u16(&entry[2..4]);
    let field_type = FieldType::from_u16(field_type_raw).ok_or(TiffError::UnknownFieldType {
        tag: code,
        field_type: field_type_raw,
    })?;

    let word = header.offset_size();
    let count = header.read_offset(&entry[4..4 + word]);
    let slot_start = 4 + word;

    let byte_len = count
        .checked_mul(field_type.size_in_bytes() as u64)
        .and_then(|len| usize::try_from(len).ok())
        .ok_or_else(|| TiffError::InvalidTagValue {
            tag: tag.name(),
            message: format!("value count {} is too large", count),
        })?;

    let data = if byte_len <= word {
        entry.slice(slot_start..slot_start + byte_len)
    } else {
        let value_offset = header.read_offset(&entry[slot_start..slot_start + word]);
        reader.read_exact_at(value_offset, byte_len).await?
    };

    Ok(Some(Tag {
        tag,
        field_type,
        count,
        data,
    }))
}

// =============================================================================
// Chain Walking
// =============================================================================

/// Parse every IFD in the file, following the next-IFD chain from the
/// header until a zero link.
///
/// The walk fails with `TooManyIfds` after [`MAX_IFDS`] directories and with
/// `IfdCycle` if a link points at a directory that was already parsed.
pub async fn read_ifd_chain<R: RangeReader + ?Sized>(
    reader: &R,
    header: &TiffHeader,
) -> Result<Vec<Ifd>, TiffError> {
    let mut ifds = Vec::new();
    let mut visited = HashSet::new();
    let mut offset = header.first_ifd_offset;

    while offset != 0 {
        if ifds.len() >= MAX_IFDS {
            return Err(TiffError::TooManyIfds(MAX_IFDS));
        }
        if !visited.insert(offset) {
            return Err(TiffError::IfdCycle(offset));
        }

        let ifd = Ifd::read(reader, header, offset).await?;
        debug!(
            source = reader.identifier(),
            index = ifds.len(),
            offset,
            tags = ifd.tags.len(),
            next = ifd.next_ifd_offset,
            "parsed IFD"
        );

        offset = ifd.next_ifd_offset;
        ifds.push(ifd);
    }

    Ok(ifds)
}

// =============================================================================
// Tests
// =============================================================================
