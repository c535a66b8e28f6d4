//! The public decoding session.
//!
//! `BzDecoder` wraps a byte source and hands out decompressed bytes on demand. A whole block is decoded
//! into scratch space when the previous one runs out, but its bytes only leave the decoder as the caller
//! reads them. As soon as a block is exhausted its CRC is checked and the next block header is read, so
//! the end of the stream (and the stream CRC check) is reached with the last byte of the last block.

use std::io::{self, Read};

use log::{debug, error, info, warn};

use crate::bitstream::bitreader::BitReader;
use crate::decompression::block_header::{read_block_start, read_stream_header, BlockStart};
use crate::decompression::bwt::BlockScratch;
use crate::decompression::output::BlockOutput;
use crate::error::{BzError, BzResult};
use crate::tools::crc::do_stream_crc;
use crate::tools::rle2_mtf_decode::rle2_mtf_decode;

/// Decoder configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Hand the source back from close() instead of dropping it.
    pub leave_open: bool,
    /// Keep decoding when another `BZh` stream follows the end of the current one.
    pub multi_stream: bool,
}

impl DecoderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leave_open(mut self, leave_open: bool) -> Self {
        self.leave_open = leave_open;
        self
    }

    pub fn multi_stream(mut self, multi_stream: bool) -> Self {
        self.multi_stream = multi_stream;
        self
    }
}

/// Where the session stands between read calls.
#[derive(Debug)]
enum StreamState {
    /// Expecting `BZh` and the block size digit.
    StreamHeader,
    /// Expecting a block header or the end of stream marker.
    AwaitingBlock,
    /// Handing out the bytes of the current block.
    Emitting(BlockOutput),
    /// Every stream has ended and its CRC matched.
    Eof,
    /// An error was returned. Nothing more can be read.
    Failed,
}

/// Streaming BZIP2 decoder over any `Read` source.
#[derive(Debug)]
pub struct BzDecoder<R> {
    br: BitReader<R>,
    options: DecoderOptions,
    state: StreamState,
    scratch: BlockScratch,
    block_size: usize,
    /// Data blocks seen across all streams, for reporting.
    block_no: usize,
    streams: usize,
    combined_crc: u32,
    total_out: u64,
}

impl<R: Read> BzDecoder<R> {
    /// New decoder over source. When leave_open is set, close() returns the source.
    pub fn new(source: R, leave_open: bool) -> Self {
        Self::with_options(source, DecoderOptions::new().leave_open(leave_open))
    }

    pub fn with_options(source: R, options: DecoderOptions) -> Self {
        Self {
            br: BitReader::new(source),
            options,
            state: StreamState::StreamHeader,
            scratch: BlockScratch::new(0),
            block_size: 0,
            block_no: 0,
            streams: 0,
            combined_crc: 0,
            total_out: 0,
        }
    }

    /// Fill buf with decompressed bytes. Returns 0 only at the end of the data. Any error poisons the decoder.
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> BzResult<usize> {
        if let StreamState::Failed = self.state {
            return Err(BzError::Poisoned);
        }
        let mut filled = 0;
        while filled < buf.len() {
            match self.advance(&mut buf[filled..]) {
                Ok(Some(n)) => filled += n,
                Ok(None) => break,
                Err(e) => {
                    self.state = StreamState::Failed;
                    self.scratch = BlockScratch::new(0);
                    return Err(e);
                }
            }
        }
        self.total_out += filled as u64;
        Ok(filled)
    }

    /// Next decompressed byte, or None at the end of the data.
    pub fn read_byte(&mut self) -> BzResult<Option<u8>> {
        let mut byte = [0_u8; 1];
        match self.read_bytes(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    /// Move the session forward by one step. Ok(None) means the end of the data.
    fn advance(&mut self, buf: &mut [u8]) -> BzResult<Option<usize>> {
        match &mut self.state {
            StreamState::StreamHeader => {
                self.start_stream()?;
                Ok(Some(0))
            }
            StreamState::AwaitingBlock => {
                self.next_block()?;
                Ok(Some(0))
            }
            StreamState::Emitting(output) => {
                let n = output.read(&self.scratch, buf);
                if output.is_done() {
                    let (expected, computed) = (output.expected_crc(), output.computed_crc());
                    self.end_block(expected, computed)?;
                    self.next_block()?;
                }
                Ok(Some(n))
            }
            StreamState::Eof => Ok(None),
            StreamState::Failed => Err(BzError::Poisoned),
        }
    }

    fn start_stream(&mut self) -> BzResult<()> {
        let block_size = if self.streams == 0 {
            read_stream_header(&mut self.br)?
        } else {
            match read_stream_header(&mut self.br) {
                Ok(block_size) => block_size,
                Err(BzError::InvalidMagic(_)) | Err(BzError::UnexpectedEndOfInput) => {
                    warn!(
                        "Ignoring trailing data after stream {} at {}.",
                        self.streams,
                        self.br.loc()
                    );
                    self.finish();
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        };
        self.streams += 1;
        self.block_size = block_size;
        self.scratch.ll8.reserve(block_size);
        self.combined_crc = 0;
        self.state = StreamState::AwaitingBlock;
        Ok(())
    }

    /// Read the next block header and decode the block, or handle the end of the stream.
    fn next_block(&mut self) -> BzResult<()> {
        match read_block_start(&mut self.br, self.block_size, self.block_no + 1)? {
            BlockStart::EndOfStream { stream_crc } => self.end_stream(stream_crc),
            BlockStart::Block(header) => {
                self.block_no += 1;
                let len = rle2_mtf_decode(&mut self.br, &header, &mut self.scratch, self.block_size)?;
                let start = self.scratch.invert(header.origin)?;
                debug!(
                    "Block {} holds {} bytes before run expansion.",
                    self.block_no, len
                );
                self.state = StreamState::Emitting(BlockOutput::new(
                    start,
                    len,
                    header.randomized,
                    header.block_crc,
                ));
                Ok(())
            }
        }
    }

    fn end_block(&mut self, expected: u32, computed: u32) -> BzResult<()> {
        if expected != computed {
            error!(
                "Block {} CRC failed! Found {:08x} looking for {:08x}.",
                self.block_no, computed, expected
            );
            return Err(BzError::BlockCrcMismatch {
                block: self.block_no,
                expected,
                computed,
            });
        }
        info!("Block {} CRCs matched.", self.block_no);
        self.combined_crc = do_stream_crc(self.combined_crc, computed);
        self.state = StreamState::AwaitingBlock;
        Ok(())
    }

    fn end_stream(&mut self, stream_crc: u32) -> BzResult<()> {
        if stream_crc != self.combined_crc {
            error!(
                "Stream CRC failed! Found {:08x} looking for {:08x}.",
                self.combined_crc, stream_crc
            );
            return Err(BzError::StreamCrcMismatch {
                expected: stream_crc,
                computed: self.combined_crc,
            });
        }
        info!("Stream {} CRCs matched.", self.streams);

        // Streams end on a byte boundary, padded with zero bits.
        self.br.align_to_byte();
        if self.options.multi_stream && self.br.has_more_bytes()? {
            self.state = StreamState::StreamHeader;
        } else {
            self.finish();
        }
        Ok(())
    }

    fn finish(&mut self) {
        self.state = StreamState::Eof;
        self.scratch = BlockScratch::new(0);
    }

    /// True once all data has been read and verified.
    pub fn is_finished(&self) -> bool {
        matches!(self.state, StreamState::Eof)
    }

    /// Decompressed bytes handed out so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Compressed bytes consumed so far. The source itself may have been read further ahead.
    pub fn total_in(&self) -> u64 {
        self.br.bytes_in()
    }

    /// Block capacity of the current stream in bytes, or 0 before the stream header has been read.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn get_ref(&self) -> &R {
        self.br.get_ref()
    }

    /// End the session, releasing all decode state. Returns the source if the decoder was told to leave
    /// it open, otherwise drops it.
    pub fn close(self) -> Option<R> {
        let leave_open = self.options.leave_open;
        let source = self.br.into_inner();
        if leave_open {
            Some(source)
        } else {
            drop(source);
            None
        }
    }
}

impl<R: Read> Read for BzDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_bytes(buf).map_err(io::Error::from)
    }
}

/// Decompress a complete in-memory BZIP2 stream (or concatenated streams).
pub fn decompress(data: &[u8]) -> BzResult<Vec<u8>> {
    let mut decoder = BzDecoder::with_options(data, DecoderOptions::new().multi_stream(true));
    let mut out = Vec::new();
    let mut buf = vec![0_u8; 64 * 1024];
    loop {
        match decoder.read_bytes(&mut buf)? {
            0 => return Ok(out),
            n => out.extend_from_slice(&buf[..n]),
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::{self, Cursor, Read};

    use super::{decompress, BzDecoder, DecoderOptions};
    use crate::decompression::test_streams::{
        sample_text, AAAAA, EMPTY, HELLO, HELLO_TEXT, MULTI_BLOCK, MULTI_STREAM, RANDOMIZED,
    };
    use crate::error::BzError;

    #[test]
    fn five_a() {
        let mut decoder = BzDecoder::new(&AAAAA[..], false);
        let mut buf = [0_u8; 16];
        assert_eq!(decoder.read_bytes(&mut buf).unwrap(), 5);
        assert_eq!(&buf[..5], b"AAAAA");
        assert_eq!(decoder.read_bytes(&mut buf).unwrap(), 0);
        assert_eq!(decoder.read_byte().unwrap(), None);
        assert_eq!(decoder.total_out(), 5);
        assert_eq!(decoder.total_in(), AAAAA.len() as u64);
        assert_eq!(decoder.block_size(), 100_000);
    }

    #[test]
    fn end_is_seen_with_the_last_byte() {
        let mut decoder = BzDecoder::new(&AAAAA[..], false);
        let mut buf = [0_u8; 5];
        assert_eq!(decoder.read_bytes(&mut buf).unwrap(), 5);
        assert!(decoder.is_finished());
    }

    #[test]
    fn small_reads() {
        let mut decoder = BzDecoder::new(&AAAAA[..], false);
        let mut buf = [0_u8; 2];
        let sizes: Vec<usize> = (0..4).map(|_| decoder.read_bytes(&mut buf).unwrap()).collect();
        assert_eq!(sizes, vec![2, 2, 1, 0]);
    }

    #[test]
    fn byte_at_a_time() {
        let mut decoder = BzDecoder::new(&HELLO[..], false);
        let mut out = Vec::new();
        while let Some(byte) = decoder.read_byte().unwrap() {
            out.push(byte);
        }
        assert_eq!(out, HELLO_TEXT.to_vec());
        assert_eq!(decoder.block_size(), 900_000);
    }

    #[test]
    fn empty_stream() {
        let mut decoder = BzDecoder::new(&EMPTY[..], false);
        assert_eq!(decoder.read_byte().unwrap(), None);
        assert!(decoder.is_finished());
        assert_eq!(decoder.total_out(), 0);
    }

    #[test]
    fn empty_buffer_reads_nothing() {
        let mut decoder = BzDecoder::new(&AAAAA[..], false);
        assert_eq!(decoder.read_bytes(&mut []).unwrap(), 0);
        assert!(!decoder.is_finished());
        assert_eq!(decoder.read_byte().unwrap(), Some(b'A'));
    }

    #[test]
    fn multi_block() {
        let expected = sample_text(600_000, 1);
        assert_eq!(decompress(MULTI_BLOCK).unwrap(), expected);

        // Odd sized reads through std::io::Read
        let mut decoder = BzDecoder::new(MULTI_BLOCK, false);
        let mut out = Vec::new();
        let mut buf = [0_u8; 777];
        loop {
            let n = decoder.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        assert!(out == expected);
        assert_eq!(decoder.total_out(), 600_000);
    }

    #[test]
    fn multi_stream() {
        let mut expected = b"AAAAA".to_vec();
        expected.extend(sample_text(3_000, 2));

        let options = DecoderOptions::new().multi_stream(true);
        let mut decoder = BzDecoder::with_options(MULTI_STREAM, options);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).unwrap();
        assert_eq!(out, expected);
        assert_eq!(decoder.block_size(), 900_000);

        // Without multi stream support only the first stream is decoded.
        let mut decoder = BzDecoder::new(MULTI_STREAM, false);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"AAAAA".to_vec());
        assert!(decoder.is_finished());
    }

    #[test]
    fn trailing_garbage_is_ignored() {
        let mut data = AAAAA.to_vec();
        data.extend_from_slice(b"not bzip2 at all");
        assert_eq!(decompress(&data).unwrap(), b"AAAAA".to_vec());
        data.truncate(AAAAA.len() + 2);
        assert_eq!(decompress(&data).unwrap(), b"AAAAA".to_vec());
    }

    #[test]
    fn randomized_block() {
        let first = decompress(RANDOMIZED).unwrap();
        assert_eq!(first, sample_text(20_000, 7));
        assert_eq!(decompress(RANDOMIZED).unwrap(), first);
    }

    #[test]
    fn block_crc_bit_flips() {
        // The block CRC sits in bytes 10..14.
        for bit in 0..32 {
            let mut data = AAAAA.to_vec();
            data[10 + bit / 8] ^= 0x80 >> (bit % 8);
            let mut decoder = BzDecoder::new(data.as_slice(), false);
            let mut buf = [0_u8; 16];
            assert!(matches!(
                decoder.read_bytes(&mut buf),
                Err(BzError::BlockCrcMismatch { block: 1, computed: 0x2ebd_6745, .. })
            ));
            assert!(matches!(decoder.read_bytes(&mut buf), Err(BzError::Poisoned)));
            assert!(matches!(decoder.read_byte(), Err(BzError::Poisoned)));
        }
    }

    #[test]
    fn stream_crc_flip() {
        let mut data = AAAAA.to_vec();
        let last = data.len() - 1;
        data[last] ^= 1;
        assert!(matches!(
            decompress(&data),
            Err(BzError::StreamCrcMismatch {
                expected: 0x2ebd_6744,
                computed: 0x2ebd_6745
            })
        ));
    }

    #[test]
    fn truncated() {
        for cut in [4, 12, 30, AAAAA.len() - 1] {
            assert!(
                matches!(decompress(&AAAAA[..cut]), Err(BzError::UnexpectedEndOfInput)),
                "cut at {}",
                cut
            );
        }
        for cut in [100, MULTI_BLOCK.len() / 2, MULTI_BLOCK.len() - 3] {
            assert!(
                matches!(decompress(&MULTI_BLOCK[..cut]), Err(BzError::UnexpectedEndOfInput)),
                "cut at {}",
                cut
            );
        }
        let mut decoder = BzDecoder::new(&AAAAA[..20], false);
        let mut out = Vec::new();
        let err = decoder.read_to_end(&mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn bad_magic() {
        assert!(matches!(decompress(b"PK\x03\x04"), Err(BzError::InvalidMagic(_))));
        assert!(matches!(decompress(b"BZx9"), Err(BzError::InvalidMagic(_))));

        let mut data = AAAAA.to_vec();
        data[4] = 0x32;
        assert!(matches!(decompress(&data), Err(BzError::InvalidMagic(_))));
    }

    #[test]
    fn bad_block_size() {
        let mut data = AAAAA.to_vec();
        data[3] = b'0';
        let mut decoder = BzDecoder::new(data.as_slice(), false);
        assert!(matches!(decoder.read_byte(), Err(BzError::InvalidBlockSize(b'0'))));
        assert!(matches!(decoder.read_byte(), Err(BzError::Poisoned)));

        let mut out = Vec::new();
        let err = BzDecoder::new(data.as_slice(), false)
            .read_to_end(&mut out)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn close_hands_back_the_source_when_asked() {
        let mut decoder = BzDecoder::new(Cursor::new(AAAAA.to_vec()), true);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).unwrap();
        assert_eq!(decoder.get_ref().get_ref().len(), AAAAA.len());
        let source = decoder.close().unwrap();
        assert_eq!(source.into_inner(), AAAAA.to_vec());

        let decoder = BzDecoder::new(Cursor::new(AAAAA.to_vec()), false);
        assert!(decoder.close().is_none());
    }
}
