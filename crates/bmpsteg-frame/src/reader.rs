use std::io::{ErrorKind, Read};

use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::bits::{unpack, BLOCK_SIZE};
use crate::codec::{parse_size, FrameConfig, SEPARATOR};
use crate::error::{FrameError, Result};

/// Reads hidden fields back out of a carrier stream.
///
/// Every logical byte is recovered from one 8-byte carrier block. The stream
/// must already be positioned at the first block to read.
pub struct FieldReader<T> {
    inner: T,
    config: FrameConfig,
    blocks_read: u64,
}

impl<T: Read> FieldReader<T> {
    /// Create a new field reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new field reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            config,
            blocks_read: 0,
        }
    }

    /// Read `magic.len()` blocks and compare them with the marker.
    ///
    /// A carrier that ends early is a mismatch, not an error.
    pub fn matches_magic(&mut self, magic: &[u8]) -> Result<bool> {
        let mut matched = true;
        for expected in magic {
            match self.read_block()? {
                Some(block) => matched &= unpack(&block) == *expected,
                None => return Ok(false),
            }
        }
        Ok(matched)
    }

    /// Read bytes until `separator` is decoded (the separator is consumed, not returned).
    ///
    /// Returns `Err(FrameError::Truncated)` if the carrier ends first and
    /// `Err(FrameError::FieldTooLong)` if more than `max_len` bytes precede the separator.
    pub fn read_until(
        &mut self,
        separator: u8,
        max_len: usize,
        field: &'static str,
    ) -> Result<Vec<u8>> {
        let mut text = Vec::with_capacity(max_len.min(64));
        loop {
            let byte = self.read_byte(field)?;
            if byte == separator {
                trace!(field, len = text.len(), "read separated field");
                return Ok(text);
            }
            if text.len() == max_len {
                return Err(FrameError::FieldTooLong { max: max_len });
            }
            text.push(byte);
        }
    }

    /// Read the extension field, bounded by `max_extension_len`.
    pub fn read_extension(&mut self) -> Result<String> {
        let raw = self.read_until(SEPARATOR, self.config.max_extension_len, "extension")?;
        String::from_utf8(raw).map_err(|_| FrameError::Malformed("extension is not valid UTF-8"))
    }

    /// Read and parse the decimal size field, bounded by `max_size_digits`.
    pub fn read_size(&mut self) -> Result<u64> {
        let raw = self.read_until(SEPARATOR, self.config.max_size_digits, "size")?;
        parse_size(&raw)
    }

    /// Read exactly `count` bytes. The count is authoritative; no separator is expected.
    ///
    /// The count is checked against `max_payload_size` before anything is allocated.
    pub fn read_exact_bytes(&mut self, count: u64, field: &'static str) -> Result<Bytes> {
        if count > self.config.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: count,
                max: self.config.max_payload_size,
            });
        }

        let mut out = BytesMut::with_capacity(count as usize);
        for _ in 0..count {
            out.put_u8(self.read_byte(field)?);
        }
        Ok(out.freeze())
    }

    /// Read one logical byte.
    pub fn read_byte(&mut self, field: &'static str) -> Result<u8> {
        match self.read_block()? {
            Some(block) => Ok(unpack(&block)),
            None => Err(FrameError::Truncated { field }),
        }
    }

    fn read_block(&mut self) -> Result<Option<[u8; BLOCK_SIZE]>> {
        let mut block = [0u8; BLOCK_SIZE];
        let mut filled = 0usize;
        while filled < BLOCK_SIZE {
            match self.inner.read(&mut block[filled..]) {
                Ok(0) => return Ok(None),
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        self.blocks_read += 1;
        Ok(Some(block))
    }

    /// Number of complete carrier blocks consumed so far.
    pub fn blocks_read(&self) -> u64 {
        self.blocks_read
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current field reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::bits::pack;
    use crate::codec::MAGIC;

    fn carrier_for(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(data.len() * BLOCK_SIZE);
        for (i, byte) in data.iter().enumerate() {
            let fill = [(i as u8).wrapping_mul(37); BLOCK_SIZE];
            out.extend_from_slice(&pack(*byte, &fill).unwrap());
        }
        out
    }

    #[test]
    fn detects_magic() {
        let mut reader = FieldReader::new(Cursor::new(carrier_for(b"#*txt*")));
        assert!(reader.matches_magic(&MAGIC).unwrap());
        assert_eq!(reader.blocks_read(), 2);
    }

    #[test]
    fn magic_mismatch() {
        let mut reader = FieldReader::new(Cursor::new(carrier_for(b"#!txt*")));
        assert!(!reader.matches_magic(&MAGIC).unwrap());
    }

    #[test]
    fn short_magic_is_mismatch() {
        let mut bytes = carrier_for(b"#*");
        bytes.truncate(BLOCK_SIZE + 3);
        let mut reader = FieldReader::new(Cursor::new(bytes));
        assert!(!reader.matches_magic(&MAGIC).unwrap());
    }

    #[test]
    fn reads_until_separator() {
        let mut reader = FieldReader::new(Cursor::new(carrier_for(b"txt*42*")));
        assert_eq!(reader.read_until(b'*', 3, "extension").unwrap(), b"txt");
        assert_eq!(reader.read_until(b'*', 20, "size").unwrap(), b"42");
    }

    #[test]
    fn read_until_truncated() {
        let mut reader = FieldReader::new(Cursor::new(carrier_for(b"tx")));
        let err = reader.read_until(b'*', 3, "extension").unwrap_err();
        assert!(matches!(err, FrameError::Truncated { field: "extension" }));
    }

    #[test]
    fn read_until_bounded() {
        let mut reader = FieldReader::new(Cursor::new(carrier_for(b"jpeg*")));
        let err = reader.read_until(b'*', 3, "extension").unwrap_err();
        assert!(matches!(err, FrameError::FieldTooLong { max: 3 }));
    }

    #[test]
    fn reads_extension_and_size() {
        let mut reader = FieldReader::new(Cursor::new(carrier_for(b"bin*1024*")));
        assert_eq!(reader.read_extension().unwrap(), "bin");
        assert_eq!(reader.read_size().unwrap(), 1024);
    }

    #[test]
    fn rejects_non_decimal_size() {
        let mut reader = FieldReader::new(Cursor::new(carrier_for(b"1x2*")));
        assert!(matches!(reader.read_size(), Err(FrameError::Malformed(_))));
    }

    #[test]
    fn reads_exact_count_ignoring_separators() {
        let mut reader = FieldReader::new(Cursor::new(carrier_for(b"a*b*")));
        let payload = reader.read_exact_bytes(3, "payload").unwrap();
        assert_eq!(payload.as_ref(), b"a*b");
    }

    #[test]
    fn exact_read_truncated() {
        let mut reader = FieldReader::new(Cursor::new(carrier_for(b"ab")));
        let err = reader.read_exact_bytes(5, "payload").unwrap_err();
        assert!(matches!(err, FrameError::Truncated { field: "payload" }));
    }

    #[test]
    fn exact_read_checks_limit_first() {
        let cfg = FrameConfig {
            max_payload_size: 4,
            ..FrameConfig::default()
        };
        let mut reader = FieldReader::with_config(Cursor::new(Vec::<u8>::new()), cfg);
        let err = reader.read_exact_bytes(u64::MAX, "payload").unwrap_err();
        assert!(matches!(
            err,
            FrameError::PayloadTooLarge { size: u64::MAX, max: 4 }
        ));
    }

    #[test]
    fn byte_by_byte_source() {
        let reader = ByteByByteReader {
            bytes: carrier_for(b"#*"),
            pos: 0,
        };
        let mut framed = FieldReader::new(reader);
        assert!(framed.matches_magic(&MAGIC).unwrap());
    }

    #[test]
    fn interrupted_read_retries() {
        let reader = InterruptedThenData {
            interrupted: false,
            inner: Cursor::new(carrier_for(b"z")),
        };
        let mut framed = FieldReader::new(reader);
        assert_eq!(framed.read_byte("payload").unwrap(), b'z');
    }

    #[test]
    fn io_error_propagates() {
        let mut framed = FieldReader::new(FailingReader);
        let err = framed.read_byte("payload").unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::PermissionDenied));
    }

    #[test]
    fn accessors_and_into_inner() {
        let mut reader = FieldReader::new(Cursor::new(Vec::<u8>::new()));
        let _ = reader.get_ref();
        let _ = reader.get_mut();
        assert_eq!(reader.config(), &FrameConfig::default());
        let _inner = reader.into_inner();
    }

    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct InterruptedThenData {
        interrupted: bool,
        inner: Cursor<Vec<u8>>,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.inner.read(buf)
        }
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::PermissionDenied))
        }
    }
}
