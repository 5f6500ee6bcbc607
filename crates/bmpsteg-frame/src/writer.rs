use std::io::{ErrorKind, Read, Write};

use bytes::{BufMut, BytesMut};
use tracing::trace;

use crate::bits::{pack, BLOCK_SIZE};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const WRITE_CHUNK_SIZE: usize = 64 * 1024;

/// Stamps hidden fields into a copy of a carrier stream.
///
/// For every logical byte one 8-byte block is read from the carrier, its LSBs
/// are replaced, and the block is written to the destination. Both streams
/// must already be positioned at the same pixel offset.
pub struct FieldWriter<R, W> {
    carrier: R,
    dest: W,
    buf: BytesMut,
    blocks_written: u64,
}

impl<R: Read, W: Write> FieldWriter<R, W> {
    /// Create a field writer over a carrier source and a destination.
    pub fn new(carrier: R, dest: W) -> Self {
        Self {
            carrier,
            dest,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            blocks_written: 0,
        }
    }

    /// Hide every byte of `text` in consecutive carrier blocks.
    ///
    /// Blocks already written are not rolled back if the carrier ends or a
    /// stream fails part way through.
    pub fn write_field(&mut self, text: &[u8], field: &'static str) -> Result<()> {
        self.buf.clear();
        for byte in text {
            let block = self.read_block(field)?;
            self.buf.put_slice(&pack(*byte, &block)?);
            if self.buf.len() >= WRITE_CHUNK_SIZE {
                self.drain()?;
            }
        }
        self.drain()?;
        trace!(field, len = text.len(), "stamped field");
        Ok(())
    }

    fn read_block(&mut self, field: &'static str) -> Result<[u8; BLOCK_SIZE]> {
        let mut block = [0u8; BLOCK_SIZE];
        let mut filled = 0usize;
        while filled < BLOCK_SIZE {
            match self.carrier.read(&mut block[filled..]) {
                Ok(0) => return Err(FrameError::Truncated { field }),
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        Ok(block)
    }

    fn drain(&mut self) -> Result<()> {
        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.dest.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::Io(ErrorKind::WriteZero.into())),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        self.blocks_written += (self.buf.len() / BLOCK_SIZE) as u64;
        self.buf.clear();
        Ok(())
    }

    /// Flush the destination stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.dest.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Number of carrier blocks written so far.
    pub fn blocks_written(&self) -> u64 {
        self.blocks_written
    }

    /// Borrow the destination stream.
    pub fn dest_ref(&self) -> &W {
        &self.dest
    }

    /// Consume the writer and return the carrier and destination streams.
    pub fn into_parts(self) -> (R, W) {
        (self.carrier, self.dest)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::bits::unpack;
    use crate::reader::FieldReader;

    #[test]
    fn write_single_field() {
        let carrier = Cursor::new(vec![0xAAu8; 3 * BLOCK_SIZE]);
        let mut writer = FieldWriter::new(carrier, Vec::new());

        writer.write_field(b"bmp", "extension").unwrap();
        assert_eq!(writer.blocks_written(), 3);

        let (_, dest) = writer.into_parts();
        assert_eq!(dest.len(), 3 * BLOCK_SIZE);
        let decoded: Vec<u8> = dest
            .chunks_exact(BLOCK_SIZE)
            .map(|block| unpack(block.try_into().unwrap()))
            .collect();
        assert_eq!(decoded, b"bmp");
    }

    #[test]
    fn preserves_carrier_high_bits() {
        let source: Vec<u8> = (0..16u8).map(|i| i.wrapping_mul(29)).collect();
        let mut writer = FieldWriter::new(Cursor::new(source.clone()), Vec::new());
        writer.write_field(&[0x00, 0xFF], "payload").unwrap();

        let (_, dest) = writer.into_parts();
        for (stamped, original) in dest.iter().zip(source.iter()) {
            assert_eq!(stamped & !1, original & !1);
        }
    }

    #[test]
    fn consecutive_fields_share_the_cursor() {
        let carrier = Cursor::new(vec![0u8; 10 * BLOCK_SIZE]);
        let mut writer = FieldWriter::new(carrier, Vec::new());

        writer.write_field(b"#*", "magic").unwrap();
        writer.write_field(b"txt*", "extension").unwrap();
        writer.write_field(b"2*", "size").unwrap();

        let (mut carrier, dest) = writer.into_parts();
        let mut rest = Vec::new();
        carrier.read_to_end(&mut rest).unwrap();
        assert_eq!(rest.len(), 2 * BLOCK_SIZE);

        let mut reader = FieldReader::new(Cursor::new(dest));
        assert!(reader.matches_magic(b"#*").unwrap());
        assert_eq!(reader.read_extension().unwrap(), "txt");
        assert_eq!(reader.read_size().unwrap(), 2);
    }

    #[test]
    fn large_field_spans_chunks() {
        let payload: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
        let carrier = Cursor::new(vec![0x5Au8; payload.len() * BLOCK_SIZE]);
        let mut writer = FieldWriter::new(carrier, Vec::new());
        writer.write_field(&payload, "payload").unwrap();
        assert_eq!(writer.blocks_written(), payload.len() as u64);

        let (_, dest) = writer.into_parts();
        let mut reader = FieldReader::new(Cursor::new(dest));
        let decoded = reader.read_exact_bytes(payload.len() as u64, "payload").unwrap();
        assert_eq!(decoded.as_ref(), payload.as_slice());
    }

    #[test]
    fn truncated_carrier() {
        let carrier = Cursor::new(vec![0u8; BLOCK_SIZE + 4]);
        let mut writer = FieldWriter::new(carrier, Vec::new());
        let err = writer.write_field(b"ab", "payload").unwrap_err();
        assert!(matches!(err, FrameError::Truncated { field: "payload" }));
        assert!(writer.dest_ref().is_empty());
    }

    #[test]
    fn write_zero_is_an_error() {
        let carrier = Cursor::new(vec![0u8; BLOCK_SIZE]);
        let mut writer = FieldWriter::new(carrier, ZeroWriter);
        let err = writer.write_field(b"a", "payload").unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::WriteZero));
    }

    #[test]
    fn interrupted_write_retries() {
        let carrier = Cursor::new(vec![0u8; BLOCK_SIZE]);
        let dest = InterruptedThenWrite {
            interrupted: false,
            data: Vec::new(),
        };
        let mut writer = FieldWriter::new(carrier, dest);
        writer.write_field(b"q", "payload").unwrap();
        writer.flush().unwrap();

        let (_, dest) = writer.into_parts();
        assert_eq!(dest.data.len(), BLOCK_SIZE);
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct InterruptedThenWrite {
        interrupted: bool,
        data: Vec<u8>,
    }

    impl Write for InterruptedThenWrite {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
