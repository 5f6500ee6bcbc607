//! BMP carrier geometry.
//!
//! This is the lowest layer of bmpsteg. It reads the handful of fixed-offset
//! header fields the steganographic layers need from an uncompressed BMP:
//! - the pixel-data offset (byte 10, u32 LE)
//! - the image width (byte 18, 32-bit LE)
//! - the image height (byte 22, 32-bit LE)
//!
//! Everything else builds on top of the [`CarrierHeader`] type provided here.

pub mod error;
pub mod header;

pub use error::{CarrierError, Result};
pub use header::{
    CarrierHeader, BMP_SIGNATURE, BYTES_PER_PIXEL, HEIGHT_OFFSET, MIN_HEADER_LEN,
    PIXEL_OFFSET_FIELD, WIDTH_OFFSET,
};
