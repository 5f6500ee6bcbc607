//! Encode and decode sessions for hiding files in BMP carriers.
//!
//! This is the "just works" layer. Hide a file in a bitmap, recover it later,
//! and ask how much a bitmap can hold before touching anything on disk.

pub mod capacity;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod naming;
pub mod stage;

#[cfg(test)]
pub(crate) mod fixtures;

pub use capacity::{
    can_encode, image_capacity_bytes, max_payload_size, plan, required_bytes, CapacityPlan,
    CapacityPolicy,
};
pub use config::StegConfig;
pub use decoder::{DecodeReport, Decoder, FrameInfo};
pub use encoder::{EncodeReport, Encoder};
pub use error::{ErrorKind, Result, StegError};
pub use naming::{is_bmp_name, payload_extension, NamingPolicy, BUILD_TIME};
pub use stage::Stage;
