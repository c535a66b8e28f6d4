//! BitReader: A module for the Rust version of the standard BZIP2 library.
//!
//! Reads a packed bitstream, most significant bit first, for the block-oriented decoding of BZIP2 compressed data.
//!
//! NOTE: This module can read from any I/O source that supports the read() call. Bytes are pulled from the
//! source in chunks of up to BUFFER_SIZE, so the source may be read ahead of the last bit actually consumed.
//!

use std::io::{self, Read};

use crate::error::{BzError, BzResult};

const BUFFER_SIZE: usize = 32 * 1024;

/// Reads a binary Bzip2 stream.
#[derive(Debug)]
pub struct BitReader<R> {
    buffer: Vec<u8>,
    cursor: usize,
    end: usize,
    // Pending bits live in the low `bit_count` bits. bit_count stays in 0..=31 between calls.
    bit_buffer: u64,
    bit_count: u32,
    bytes_in: u64,
    source: R,
}

impl<R: Read> BitReader<R> {
    /// Creates a new BitReader (with a 32k buffer).
    pub fn new(source: R) -> Self {
        Self {
            buffer: vec![0; BUFFER_SIZE],
            cursor: 0,
            end: 0,
            bit_buffer: 0,
            bit_count: 0,
            bytes_in: 0,
            source,
        }
    }

    /// Check (and refill) buffer. Returns true if we have data, false if the source is exhausted.
    fn have_data(&mut self) -> BzResult<bool> {
        // Only try to read more data when the cursor has caught up with the data we hold
        if self.cursor < self.end {
            return Ok(true);
        }
        loop {
            match self.source.read(&mut self.buffer) {
                Ok(0) => return Ok(false),
                Ok(size) => {
                    self.cursor = 0;
                    self.end = size;
                    return Ok(true);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(BzError::Io(e)),
            }
        }
    }

    /// Move one whole byte from the buffer into the bit buffer.
    fn refill(&mut self) -> BzResult<()> {
        if !self.have_data()? {
            return Err(BzError::UnexpectedEndOfInput);
        }
        self.bit_buffer = (self.bit_buffer << 8) | self.buffer[self.cursor] as u64;
        self.cursor += 1;
        self.bit_count += 8;
        self.bytes_in += 1;
        Ok(())
    }

    /// Return the next n bits (1..=32), right justified.
    pub fn read_bits(&mut self, n: u32) -> BzResult<u32> {
        debug_assert!((1..=32).contains(&n));
        while self.bit_count < n {
            self.refill()?;
        }
        self.bit_count -= n;
        Ok(((self.bit_buffer >> self.bit_count) & ((1_u64 << n) - 1)) as u32)
    }

    /// Return *true* if the next bit is 1, *false* if 0, consuming the bit.
    pub fn read_bit(&mut self) -> BzResult<bool> {
        if self.bit_count == 0 {
            self.refill()?;
        }
        self.bit_count -= 1;
        Ok((self.bit_buffer >> self.bit_count) & 1 == 1)
    }

    /// Convenience function, calls read_bits(8).
    pub fn read_u8(&mut self) -> BzResult<u8> {
        self.read_bits(8).map(|byte| byte as u8)
    }

    /// Convenience function, calls read_bits(32). Used for CRCs.
    pub fn read_u32(&mut self) -> BzResult<u32> {
        self.read_bits(32)
    }

    /// Discard any bits left over in a partially consumed byte.
    pub fn align_to_byte(&mut self) {
        self.bit_count -= self.bit_count % 8;
    }

    /// True when at least one more whole byte can be read. Does not consume anything.
    pub fn has_more_bytes(&mut self) -> BzResult<bool> {
        if self.bit_count >= 8 {
            return Ok(true);
        }
        self.have_data()
    }

    /// Number of bytes pulled from the source into the bit buffer so far.
    pub fn bytes_in(&self) -> u64 {
        self.bytes_in
    }

    /// Debugging function. Report current position as [bytes consumed.bits used of the last byte].
    pub fn loc(&self) -> String {
        format!("[{}.{}]", self.bytes_in, (8 - self.bit_count % 8) % 8)
    }

    pub fn get_ref(&self) -> &R {
        &self.source
    }

    pub fn into_inner(self) -> R {
        self.source
    }
}

#[cfg(test)]
mod test {
    use super::BitReader;
    use crate::error::BzError;

    #[test]
    fn basic_test() {
        let x = [0b10000001_u8].as_slice();
        let mut br = BitReader::new(x);
        assert!(br.read_bit().unwrap());
        for _ in 0..6 {
            assert!(!br.read_bit().unwrap());
        }
        assert!(br.read_bit().unwrap());
        assert!(matches!(br.read_bit(), Err(BzError::UnexpectedEndOfInput)));
    }

    #[test]
    fn read_bits_test() {
        let x = [0b00011011].as_slice();
        let mut br = BitReader::new(x);
        assert_eq!(br.read_bits(5).unwrap(), 3);
        assert_eq!(br.read_bits(1).unwrap(), 0);
        assert_eq!(br.read_bits(2).unwrap(), 3);
    }

    #[test]
    fn across_byte_boundaries() {
        let x = [0b1010_1100, 0b0011_0101, 0xff].as_slice();
        let mut br = BitReader::new(x);
        assert_eq!(br.read_bits(3).unwrap(), 0b101);
        assert_eq!(br.read_bits(10).unwrap(), 0b01100_00110);
        assert_eq!(br.read_bits(11).unwrap(), 0b101_1111_1111);
    }

    #[test]
    fn read_u32_test() {
        let x = [0x31, 0x41, 0x59, 0x26, 0x53, 0x59].as_slice();
        let mut br = BitReader::new(x);
        assert_eq!(br.read_bits(24).unwrap(), 0x314159);
        assert_eq!(br.read_bits(24).unwrap(), 0x265359);

        let x = [0x80, 0xde, 0xad, 0xbe, 0xef].as_slice();
        let mut br = BitReader::new(x);
        assert!(br.read_bit().unwrap());
        assert_eq!(br.read_bits(7).unwrap(), 0);
        assert_eq!(br.read_u32().unwrap(), 0xdeadbeef);
    }

    #[test]
    fn unaligned_u32() {
        // One bit followed by 0xffffffff, then padding.
        let x = [0xff, 0xff, 0xff, 0xff, 0x80].as_slice();
        let mut br = BitReader::new(x);
        assert!(br.read_bit().unwrap());
        assert_eq!(br.read_u32().unwrap(), 0xffff_ffff);
        assert!(!br.read_bit().unwrap());
    }

    #[test]
    fn byte_test() {
        let x = "Hello, world!".as_bytes();
        let mut br = BitReader::new(x);
        assert_eq!(br.read_u8().unwrap(), b'H');
        assert_eq!(br.read_u8().unwrap(), b'e');
        assert_eq!(br.read_u8().unwrap(), b'l');
        assert_eq!(br.read_u8().unwrap(), b'l');
    }

    #[test]
    fn short_read_is_an_error() {
        let x = [0xab, 0xcd].as_slice();
        let mut br = BitReader::new(x);
        assert!(matches!(
            br.read_bits(24),
            Err(BzError::UnexpectedEndOfInput)
        ));
    }

    #[test]
    fn loc_test() {
        let x = "Hello, world!".as_bytes();
        let mut br = BitReader::new(x);
        for _ in 0..5 {
            br.read_u8().unwrap();
        }
        br.read_bit().unwrap();
        assert_eq!(br.loc(), "[6.1]");
        assert_eq!(br.bytes_in(), 6);
    }

    #[test]
    fn align_and_more_bytes() {
        let x = [0b1100_0000, b'B'].as_slice();
        let mut br = BitReader::new(x);
        assert_eq!(br.read_bits(2).unwrap(), 3);
        br.align_to_byte();
        assert!(br.has_more_bytes().unwrap());
        assert_eq!(br.read_u8().unwrap(), b'B');
        assert!(!br.has_more_bytes().unwrap());
    }
}
