/// Errors that can occur while reading carrier geometry.
#[derive(Debug, thiserror::Error)]
pub enum CarrierError {
    /// An I/O error occurred on the carrier stream.
    #[error("carrier I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The carrier is shorter than the fixed header fields.
    #[error("carrier too short for a BMP header ({len} bytes, need {min})")]
    TooShort { len: u64, min: u64 },

    /// The pixel-data offset points outside the carrier.
    #[error("pixel data offset {offset} is outside the carrier ({len} bytes)")]
    OffsetOutOfRange { offset: u32, len: u64 },

    /// The header declares a zero or negative width, or a zero height.
    #[error("invalid carrier dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },
}

pub type Result<T> = std::result::Result<T, CarrierError>;
