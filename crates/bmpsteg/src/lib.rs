//! Hide files inside BMP images.
//!
//! bmpsteg spreads every bit of a payload file over the least significant bits
//! of a bitmap's pixel bytes, together with the payload's extension and size,
//! so the file can be recovered later from the image alone.
//!
//! # Crate Structure
//!
//! - [`carrier`] — BMP header fields that locate the pixel data
//! - [`frame`] — LSB bit packing and hidden-field framing
//! - [`session`] — Encode, decode and capacity planning over files or streams

/// Re-export carrier types.
pub mod carrier {
    pub use bmpsteg_carrier::*;
}

/// Re-export frame types.
pub mod frame {
    pub use bmpsteg_frame::*;
}

/// Re-export session types.
pub mod session {
    pub use bmpsteg_session::*;
}
