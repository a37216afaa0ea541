//! Decoding of tag payloads.
//!
//! Tag values arrive as raw bytes (inline or fetched from an offset). The
//! tags this crate needs are all unsigned integers, except JPEGTables which
//! is kept as opaque bytes.

use super::parser::ByteOrder;
use super::tags::FieldType;

/// Parse `count` unsigned integers of `field_type` from `bytes`.
///
/// Returns `None` if `field_type` is not an unsigned integer type or if
/// `bytes` is too short to hold `count` elements.
pub fn parse_u64_array(
    bytes: &[u8],
    count: usize,
    field_type: FieldType,
    byte_order: ByteOrder,
) -> Option<Vec<u64>> {
    if !field_type.is_unsigned_integer() {
        return None;
    }

    let size = field_type.size_in_bytes();
    if bytes.len() < count.checked_mul(size)? {
        return None;
    }

    let values = bytes
        .chunks_exact(size)
        .take(count)
        .map(|chunk| match field_type {
            FieldType::Byte => chunk[0] as u64,
            FieldType::Short => byte_order.read_u16(chunk) as u64,
            FieldType::Long => byte_order.read_u32(chunk) as u64,
            _ => byte_order.read_u64(chunk),
        })
        .collect();

    Some(values)
}

/// Parse the first unsigned integer of `field_type` from `bytes`.
pub fn parse_first_u64(bytes: &[u8], field_type: FieldType, byte_order: ByteOrder) -> Option<u64> {
    parse_u64_array(bytes, 1, field_type, byte_order)?.first().copied()
}
