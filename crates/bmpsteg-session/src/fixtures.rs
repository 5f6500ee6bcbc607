use std::io::Cursor;

use crate::encoder::{EncodeReport, Encoder};
use crate::error::Result;

/// A 54-byte-header bitmap followed by `pixel_len` patterned pixel bytes.
pub(crate) fn bitmap(width: u32, height: u32, pixel_len: usize) -> Vec<u8> {
    let mut data = vec![0u8; 54];
    data[0..2].copy_from_slice(b"BM");
    data[2..6].copy_from_slice(&((54 + pixel_len) as u32).to_le_bytes());
    data[10..14].copy_from_slice(&54u32.to_le_bytes());
    data[14..18].copy_from_slice(&40u32.to_le_bytes());
    data[18..22].copy_from_slice(&width.to_le_bytes());
    data[22..26].copy_from_slice(&height.to_le_bytes());
    data.extend((0..pixel_len).map(|i| (i * 7 % 256) as u8));
    data
}

pub(crate) fn encode_to_vec(
    encoder: &Encoder,
    carrier: &[u8],
    payload: &[u8],
    name: &str,
) -> Result<(EncodeReport, Vec<u8>)> {
    let mut out = Vec::new();
    let sink = &mut out;
    let report = encoder.encode(
        Cursor::new(carrier.to_vec()),
        Cursor::new(payload.to_vec()),
        name,
        move || Ok(sink),
    )?;
    Ok((report, out))
}
