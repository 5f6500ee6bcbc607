use std::io::{Read, Seek, SeekFrom};

use tracing::{debug, warn};

use crate::error::{CarrierError, Result};

/// File signature of a Windows bitmap ("BM").
pub const BMP_SIGNATURE: [u8; 2] = *b"BM";

/// Byte offset of the pixel-data offset field (u32 LE).
pub const PIXEL_OFFSET_FIELD: usize = 10;

/// Byte offset of the image width field (32-bit LE).
pub const WIDTH_OFFSET: usize = 18;

/// Byte offset of the image height field (32-bit LE).
pub const HEIGHT_OFFSET: usize = 22;

/// Smallest prefix that contains every field we read.
pub const MIN_HEADER_LEN: usize = HEIGHT_OFFSET + 4;

/// Bytes per pixel assumed for an uncompressed 24-bit carrier.
pub const BYTES_PER_PIXEL: u64 = 3;

/// Geometry of a BMP carrier.
///
/// Layout of the fields read (all little-endian):
/// ```text
/// ┌────────┬─────────┬──────────────┬─────────┬──────────┬──────────┬─────────────┐
/// │ "BM"   │ ...     │ Pixel offset │ ...     │ Width    │ Height   │ ... pixels  │
/// │ 0..2   │         │ 10..14 (u32) │         │ 18..22   │ 22..26   │ offset..EOF │
/// └────────┴─────────┴──────────────┴─────────┴──────────┴──────────┴─────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarrierHeader {
    /// Where the pixel bytes begin. Everything before it is header.
    pub pixel_data_offset: u32,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels (magnitude; see `top_down`).
    pub height: u32,
    /// True when the stored height was negative (top-down row order).
    pub top_down: bool,
    /// Total carrier length in bytes.
    pub stream_len: u64,
}

impl CarrierHeader {
    /// Read the header fields from a seekable carrier stream.
    ///
    /// The stream position is left just past the height field; callers seek
    /// to `pixel_data_offset` themselves.
    pub fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let stream_len = reader.seek(SeekFrom::End(0))?;
        if stream_len < MIN_HEADER_LEN as u64 {
            return Err(CarrierError::TooShort {
                len: stream_len,
                min: MIN_HEADER_LEN as u64,
            });
        }

        reader.seek(SeekFrom::Start(0))?;
        let mut head = [0u8; MIN_HEADER_LEN];
        reader.read_exact(&mut head)?;

        Self::parse(&head, stream_len)
    }

    /// Parse the header fields from the first bytes of a carrier.
    pub fn parse(head: &[u8], stream_len: u64) -> Result<Self> {
        if head.len() < MIN_HEADER_LEN {
            return Err(CarrierError::TooShort {
                len: head.len() as u64,
                min: MIN_HEADER_LEN as u64,
            });
        }

        if head[0..2] != BMP_SIGNATURE {
            warn!(
                signature = ?&head[0..2],
                "carrier does not start with BM; treating it as a bitmap anyway"
            );
        }

        let pixel_data_offset = read_u32_le(head, PIXEL_OFFSET_FIELD);
        let width = read_u32_le(head, WIDTH_OFFSET) as i32;
        let height = read_u32_le(head, HEIGHT_OFFSET) as i32;

        if width <= 0 || height == 0 {
            return Err(CarrierError::InvalidDimensions { width, height });
        }

        // The stamped region must not overlap the fields we re-read on decode.
        if (pixel_data_offset as usize) < MIN_HEADER_LEN || u64::from(pixel_data_offset) > stream_len
        {
            return Err(CarrierError::OffsetOutOfRange {
                offset: pixel_data_offset,
                len: stream_len,
            });
        }

        let header = Self {
            pixel_data_offset,
            width: width as u32,
            height: height.unsigned_abs(),
            top_down: height < 0,
            stream_len,
        };
        debug!(
            offset = header.pixel_data_offset,
            width = header.width,
            height = header.height,
            len = header.stream_len,
            "read carrier header"
        );
        Ok(header)
    }

    /// Number of pixels declared by the header.
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Bytes actually present from the pixel-data offset to end-of-file.
    pub fn pixel_bytes(&self) -> u64 {
        self.stream_len - u64::from(self.pixel_data_offset)
    }
}

fn read_u32_le(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn bitmap(width: i32, height: i32, pixel_len: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; 54];
        bytes[0..2].copy_from_slice(&BMP_SIGNATURE);
        bytes[2..6].copy_from_slice(&((54 + pixel_len) as u32).to_le_bytes());
        bytes[10..14].copy_from_slice(&54u32.to_le_bytes());
        bytes[14..18].copy_from_slice(&40u32.to_le_bytes());
        bytes[18..22].copy_from_slice(&width.to_le_bytes());
        bytes[22..26].copy_from_slice(&height.to_le_bytes());
        bytes[26..28].copy_from_slice(&1u16.to_le_bytes());
        bytes[28..30].copy_from_slice(&24u16.to_le_bytes());
        bytes.resize(54 + pixel_len, 0x80);
        bytes
    }

    #[test]
    fn reads_standard_header() {
        let mut cursor = Cursor::new(bitmap(4, 2, 24));
        let header = CarrierHeader::read_from(&mut cursor).unwrap();

        assert_eq!(header.pixel_data_offset, 54);
        assert_eq!(header.width, 4);
        assert_eq!(header.height, 2);
        assert!(!header.top_down);
        assert_eq!(header.stream_len, 78);
        assert_eq!(header.pixel_bytes(), 24);
        assert_eq!(header.pixel_count(), 8);
    }

    #[test]
    fn negative_height_is_top_down() {
        let header = CarrierHeader::parse(&bitmap(4, -3, 36), 90).unwrap();
        assert_eq!(header.height, 3);
        assert!(header.top_down);
    }

    #[test]
    fn rejects_short_carrier() {
        let mut cursor = Cursor::new(vec![0u8; 20]);
        let err = CarrierHeader::read_from(&mut cursor).unwrap_err();
        assert!(matches!(err, CarrierError::TooShort { len: 20, .. }));
    }

    #[test]
    fn rejects_zero_dimensions() {
        let err = CarrierHeader::parse(&bitmap(0, 2, 0), 54).unwrap_err();
        assert!(matches!(err, CarrierError::InvalidDimensions { width: 0, .. }));

        let err = CarrierHeader::parse(&bitmap(2, 0, 0), 54).unwrap_err();
        assert!(matches!(err, CarrierError::InvalidDimensions { height: 0, .. }));
    }

    #[test]
    fn rejects_offset_past_end() {
        let mut bytes = bitmap(4, 2, 24);
        bytes[10..14].copy_from_slice(&500u32.to_le_bytes());
        let err = CarrierHeader::parse(&bytes, bytes.len() as u64).unwrap_err();
        assert!(matches!(err, CarrierError::OffsetOutOfRange { offset: 500, .. }));
    }

    #[test]
    fn rejects_offset_inside_geometry_fields() {
        let mut bytes = bitmap(4, 2, 24);
        bytes[10..14].copy_from_slice(&12u32.to_le_bytes());
        let err = CarrierHeader::parse(&bytes, bytes.len() as u64).unwrap_err();
        assert!(matches!(err, CarrierError::OffsetOutOfRange { offset: 12, .. }));
    }

    #[test]
    fn tolerates_missing_signature() {
        let mut bytes = bitmap(4, 2, 24);
        bytes[0..2].copy_from_slice(b"XX");
        assert!(CarrierHeader::parse(&bytes, bytes.len() as u64).is_ok());
    }
}
