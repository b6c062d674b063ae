use std::fmt;
use std::io::{self, Read};

use tracing::{debug, warn};

use crate::tape::error::TapeError;
use crate::tape::Strictness;
use crate::util;

/// A TAP block is preceded by its length as a 16-bit little-endian value.
pub const LENGTH_PREFIX_SIZE: usize = 2;
/// The largest payload a 16-bit length prefix can describe.
pub const MAX_BLOCK_SIZE: usize = u16::MAX as usize;

/// One block of a TAP stream.  The payload borrows the reader's buffer and
/// is only valid until the next block is read.
pub struct TapBlock<'a> {
    data: &'a [u8],
}

impl<'a> TapBlock<'a> {
    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<'a> fmt::Debug for TapBlock<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "TAP block of {} bytes:", self.len())?;
        util::hexdump(f, "  ", self.data)
    }
}

/// A TapReader splits a TAP byte stream into its length-prefixed blocks.
pub struct TapReader<R: Read> {
    reader: R,
    strictness: Strictness,
    buffer: Vec<u8>,
    blocks_read: usize,
    truncated: bool,
}

impl<R: Read> TapReader<R> {
    /// Create a reader over the provided byte source.  The block buffer is
    /// allocated once, up front, at the maximum block size.
    pub fn new(reader: R, strictness: Strictness) -> io::Result<TapReader<R>> {
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(MAX_BLOCK_SIZE)
            .map_err(|_| TapeError::OutOfMemory.to_io_error())?;
        Ok(TapReader {
            reader,
            strictness,
            buffer,
            blocks_read: 0,
            truncated: false,
        })
    }

    /// Number of complete blocks returned so far.
    pub fn blocks_read(&self) -> usize {
        self.blocks_read
    }

    /// True if the stream ended part way through a block.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Read the next block.  `Ok(None)` marks the end of the stream, which
    /// in lenient mode includes a final block shorter than its declared
    /// length.
    pub fn next_block(&mut self) -> io::Result<Option<TapBlock<'_>>> {
        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        match read_full(&mut self.reader, &mut prefix)? {
            0 => return Ok(None),
            LENGTH_PREFIX_SIZE => {}
            available => {
                return self.truncation(TapeError::TruncatedBlock {
                    declared: LENGTH_PREFIX_SIZE,
                    available,
                })
            }
        }
        let declared = u16::from_le_bytes(prefix) as usize;

        self.buffer.resize(declared, 0);
        let available = read_full(&mut self.reader, &mut self.buffer)?;
        if available != declared {
            return self.truncation(TapeError::TruncatedBlock {
                declared,
                available,
            });
        }

        self.blocks_read += 1;
        debug!(block = self.blocks_read, length = declared, "read TAP block");
        Ok(Some(TapBlock { data: &self.buffer }))
    }

    fn truncation<T>(&mut self, error: TapeError) -> io::Result<Option<T>> {
        self.truncated = true;
        match self.strictness {
            Strictness::Strict => Err(error.into()),
            Strictness::Lenient => {
                warn!("{}; treating as end of tape", error);
                Ok(None)
            }
        }
    }
}

/// Fill `buffer` from `reader`, stopping early only at end of stream.
/// Returns the number of bytes read.
fn read_full<R: Read>(reader: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Hands out at most one byte per read, interrupting every other call.
    struct TrickleReader {
        bytes: Vec<u8>,
        position: usize,
        interrupt: bool,
    }

    impl Read for TrickleReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "again"));
            }
            if self.position >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.position];
            self.position += 1;
            Ok(1)
        }
    }

    fn lenient(bytes: &[u8]) -> TapReader<Cursor<&[u8]>> {
        TapReader::new(Cursor::new(bytes), Strictness::Lenient).unwrap()
    }

    #[test]
    fn test_read_blocks() {
        let mut reader = lenient(&[0x02, 0x00, 0xAA, 0xBB, 0x01, 0x00, 0xCC]);
        assert_eq!(reader.next_block().unwrap().unwrap().data(), &[0xAA, 0xBB]);
        assert_eq!(reader.next_block().unwrap().unwrap().data(), &[0xCC]);
        assert!(reader.next_block().unwrap().is_none());
        assert_eq!(reader.blocks_read(), 2);
        assert!(!reader.truncated());
    }

    #[test]
    fn test_empty_block() {
        let mut reader = lenient(&[0x00, 0x00, 0x01, 0x00, 0x7F]);
        assert!(reader.next_block().unwrap().unwrap().is_empty());
        assert_eq!(reader.next_block().unwrap().unwrap().data(), &[0x7F]);
        assert!(reader.next_block().unwrap().is_none());
    }

    #[test]
    fn test_little_endian_length() {
        let mut bytes = vec![0x01, 0x01];
        bytes.extend((0..0x101).map(|i| i as u8));
        let mut reader = lenient(&bytes);
        assert_eq!(reader.next_block().unwrap().unwrap().len(), 0x101);
    }

    #[test]
    fn test_maximum_block() {
        let mut bytes = vec![0xFF, 0xFF];
        bytes.extend(std::iter::repeat(0x55).take(MAX_BLOCK_SIZE));
        let mut reader = lenient(&bytes);
        assert_eq!(reader.next_block().unwrap().unwrap().len(), MAX_BLOCK_SIZE);
        assert!(reader.next_block().unwrap().is_none());
    }

    #[test]
    fn test_truncated_payload_is_end_of_stream() {
        let mut reader = lenient(&[0x05, 0x00, 0x01, 0x02]);
        assert!(reader.next_block().unwrap().is_none());
        assert_eq!(reader.blocks_read(), 0);
        assert!(reader.truncated());
    }

    #[test]
    fn test_lone_length_byte_is_end_of_stream() {
        let mut reader = lenient(&[0x01, 0x00, 0x42, 0x07]);
        assert_eq!(reader.next_block().unwrap().unwrap().data(), &[0x42]);
        assert!(reader.next_block().unwrap().is_none());
        assert!(reader.truncated());
    }

    #[test]
    fn test_strict_truncation() {
        let bytes: [u8; 4] = [0x05, 0x00, 0x01, 0x02];
        let mut reader = TapReader::new(Cursor::new(&bytes[..]), Strictness::Strict).unwrap();
        let error = reader.next_block().err().unwrap();
        assert_eq!(
            TapeError::from_io_error(&error),
            Some(TapeError::TruncatedBlock {
                declared: 5,
                available: 2
            })
        );
    }

    #[test]
    fn test_strict_clean_end() {
        let bytes: [u8; 3] = [0x01, 0x00, 0x42];
        let mut reader = TapReader::new(Cursor::new(&bytes[..]), Strictness::Strict).unwrap();
        assert!(reader.next_block().unwrap().is_some());
        assert!(reader.next_block().unwrap().is_none());
        assert!(!reader.truncated());
    }

    #[test]
    fn test_short_reads() {
        let trickle = TrickleReader {
            bytes: vec![0x03, 0x00, 0x10, 0x20, 0x30],
            position: 0,
            interrupt: false,
        };
        let mut reader = TapReader::new(trickle, Strictness::Strict).unwrap();
        assert_eq!(
            reader.next_block().unwrap().unwrap().data(),
            &[0x10, 0x20, 0x30]
        );
        assert!(reader.next_block().unwrap().is_none());
    }

    #[test]
    fn test_debug_hexdump() {
        let mut reader = lenient(&[0x02, 0x00, 0x41, 0x00]);
        let block = reader.next_block().unwrap().unwrap();
        assert_eq!(
            format!("{:?}", block),
            format!("TAP block of 2 bytes:\n  0000: 41 00 {}A.", " ".repeat(14 * 3))
        );
    }
}
