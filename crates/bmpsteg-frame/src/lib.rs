//! LSB bit packing and hidden-field framing.
//!
//! This is the core value-add layer of bmpsteg. Every hidden byte is spread
//! across 8 carrier bytes, one bit per carrier LSB, and the hidden stream is
//! framed as:
//! - A 2-byte magic marker ("#*") for detection
//! - The payload file extension, terminated by `*`
//! - The decimal payload size, terminated by `*`
//! - The payload bytes, terminated by `*`

pub mod bits;
pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use bits::{pack, unpack, BLOCK_SIZE};
pub use codec::{
    extension_field, frame_len, parse_size, size_field, wire_size, FrameConfig,
    DEFAULT_MAX_PAYLOAD, MAGIC, MAX_EXT_LEN, MAX_SIZE_DIGITS, SEPARATOR, SIZE_FIELD_LEN,
};
pub use error::{FrameError, Result};
pub use reader::FieldReader;
pub use writer::FieldWriter;
