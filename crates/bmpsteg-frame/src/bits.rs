//! Byte ⇄ carrier-block conversion by LSB substitution.

use crate::error::{FrameError, Result};

/// Carrier bytes consumed per hidden byte.
pub const BLOCK_SIZE: usize = 8;

/// Hide `data` in the least-significant bits of an 8-byte carrier block.
///
/// Bit `i` of `data` (bit 0 = LSB) replaces the LSB of `block[i]`. The upper
/// seven bits of every carrier byte are preserved.
pub fn pack(data: u8, block: &[u8]) -> Result<[u8; BLOCK_SIZE]> {
    let block: &[u8; BLOCK_SIZE] = block
        .try_into()
        .map_err(|_| FrameError::InvalidBlock { len: block.len() })?;

    let mut out = *block;
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = (*byte & !1) | ((data >> i) & 1);
    }
    Ok(out)
}

/// Recover the byte hidden in an 8-byte carrier block.
pub fn unpack(block: &[u8; BLOCK_SIZE]) -> u8 {
    block
        .iter()
        .enumerate()
        .fold(0u8, |acc, (i, byte)| acc | ((byte & 1) << i))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_places_bit_i_in_byte_i() {
        let block = pack(0b1010_0101, &[0u8; BLOCK_SIZE]).unwrap();
        assert_eq!(block, [1, 0, 1, 0, 0, 1, 0, 1]);
    }

    #[test]
    fn pack_preserves_upper_bits() {
        let carrier = [0xFE, 0xFF, 0x10, 0x11, 0x80, 0x81, 0x7E, 0x7F];
        let block = pack(0x00, &carrier).unwrap();
        for (packed, original) in block.iter().zip(carrier.iter()) {
            assert_eq!(packed & !1, original & !1);
            assert_eq!(packed & 1, 0);
        }

        let block = pack(0xFF, &carrier).unwrap();
        for (packed, original) in block.iter().zip(carrier.iter()) {
            assert_eq!(packed & !1, original & !1);
            assert_eq!(packed & 1, 1);
        }
    }

    #[test]
    fn unpack_reads_lsbs_in_order() {
        assert_eq!(unpack(&[1, 1, 0, 0, 0, 1, 0, 0]), b'#');
        assert_eq!(unpack(&[0xFE; BLOCK_SIZE]), 0x00);
        assert_eq!(unpack(&[0x01; BLOCK_SIZE]), 0xFF);
    }

    #[test]
    fn roundtrip_every_byte_over_edge_blocks() {
        let blocks: [[u8; BLOCK_SIZE]; 4] = [
            [0x00; BLOCK_SIZE],
            [0xFF; BLOCK_SIZE],
            [0x55, 0xAA, 0x55, 0xAA, 0x55, 0xAA, 0x55, 0xAA],
            [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0],
        ];
        for block in &blocks {
            for b in 0..=u8::MAX {
                let packed = pack(b, block).unwrap();
                assert_eq!(unpack(&packed), b, "byte {b:#04x} over {block:?}");
            }
        }
    }

    #[test]
    fn pack_rejects_wrong_block_size() {
        let err = pack(1, &[0u8; 7]).unwrap_err();
        assert!(matches!(err, FrameError::InvalidBlock { len: 7 }));

        let err = pack(1, &[0u8; 9]).unwrap_err();
        assert!(matches!(err, FrameError::InvalidBlock { len: 9 }));
    }
}
