use bytes::{BufMut, Bytes, BytesMut};

use crate::bits::BLOCK_SIZE;
use crate::error::{FrameError, Result};

/// Magic marker stamped first: "#*" (0x23 0x2A).
pub const MAGIC: [u8; 2] = *b"#*";

/// Field terminator used after the extension, the size and the payload.
pub const SEPARATOR: u8 = b'*';

/// Extension budget in logical bytes: three characters plus the separator.
pub const MAX_EXT_LEN: usize = 4;

/// Size-field budget used by capacity planning.
pub const SIZE_FIELD_LEN: usize = std::mem::size_of::<u64>() + 1;

/// Decimal digits needed for `u64::MAX`.
pub const MAX_SIZE_DIGITS: usize = 20;

/// Default maximum payload size: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: u64 = 16 * 1024 * 1024;

/// Logical length of a frame before bit expansion.
///
/// Layout:
/// ```text
/// ┌──────────┬───────────┬─────┬──────────────┬─────┬───────────┬─────┐
/// │ "#*"     │ Extension │ "*" │ Size (ASCII) │ "*" │ Payload   │ "*" │
/// │ 2 bytes  │ ≤ 3 bytes │     │ decimal      │     │ N bytes   │     │
/// └──────────┴───────────┴─────┴──────────────┴─────┴───────────┴─────┘
/// ```
///
/// Saturates at `u64::MAX` for sizes no carrier could hold.
pub fn frame_len(extension_len: usize, payload_len: u64) -> u64 {
    let overhead = (MAGIC.len() + extension_len + 1 + decimal_digits(payload_len) + 2) as u64;
    payload_len.saturating_add(overhead)
}

/// Carrier bytes a frame occupies once every logical byte is spread over a block.
pub fn wire_size(extension_len: usize, payload_len: u64) -> u64 {
    frame_len(extension_len, payload_len).saturating_mul(BLOCK_SIZE as u64)
}

/// Build the separator-terminated extension field.
pub fn extension_field(extension: &str, max_len: usize) -> Result<Bytes> {
    if extension.len() > max_len {
        return Err(FrameError::FieldTooLong { max: max_len });
    }
    if extension.as_bytes().contains(&SEPARATOR) {
        return Err(FrameError::Malformed("extension contains the field separator"));
    }

    let mut field = BytesMut::with_capacity(extension.len() + 1);
    field.put_slice(extension.as_bytes());
    field.put_u8(SEPARATOR);
    Ok(field.freeze())
}

/// Build the separator-terminated decimal size field.
pub fn size_field(size: u64) -> Bytes {
    let digits = size.to_string();
    let mut field = BytesMut::with_capacity(digits.len() + 1);
    field.put_slice(digits.as_bytes());
    field.put_u8(SEPARATOR);
    field.freeze()
}

/// Parse a decoded size field (separator already stripped).
pub fn parse_size(field: &[u8]) -> Result<u64> {
    if field.is_empty() || !field.iter().all(u8::is_ascii_digit) {
        return Err(FrameError::Malformed("size field is not a decimal number"));
    }

    field.iter().try_fold(0u64, |acc, digit| {
        acc.checked_mul(10)
            .and_then(|acc| acc.checked_add(u64::from(digit - b'0')))
            .ok_or(FrameError::Malformed("size field overflows u64"))
    })
}

fn decimal_digits(mut value: u64) -> usize {
    let mut digits = 1;
    while value >= 10 {
        value /= 10;
        digits += 1;
    }
    digits
}

/// Configuration for the field codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameConfig {
    /// Maximum payload size in bytes accepted on decode. Default: 16 MiB.
    pub max_payload_size: u64,
    /// Maximum extension length in characters. Default: 3.
    pub max_extension_len: usize,
    /// Maximum digits accepted in the size field. Default: 20.
    pub max_size_digits: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            max_extension_len: MAX_EXT_LEN - 1,
            max_size_digits: MAX_SIZE_DIGITS,
        }
    }
}
