/// Errors that can occur while packing or framing hidden data.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A carrier block did not have exactly 8 bytes.
    #[error("carrier block must be 8 bytes, got {len}")]
    InvalidBlock { len: usize },

    /// The declared payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: u64, max: u64 },

    /// A separator-terminated field ran past its maximum length.
    #[error("field exceeds {max} bytes without a separator")]
    FieldTooLong { max: usize },

    /// An I/O error occurred while reading or writing carrier bytes.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The carrier ended before the field was complete.
    #[error("carrier ended before the {field} field was complete")]
    Truncated { field: &'static str },

    /// The logical frame bytes could not be parsed.
    #[error("malformed frame: {0}")]
    Malformed(&'static str),
}

pub type Result<T> = std::result::Result<T, FrameError>;
