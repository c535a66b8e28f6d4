//! Error taxonomy for the BZIP2 decoder.
//!
//! Every variant is fatal to the decoding session. Once a `BzDecoder` has returned one of these,
//! it is poisoned and every further read returns `BzError::Poisoned`.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BzError {
    /// Error reported by the underlying byte source.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The source ran dry in the middle of a field.
    #[error("Unexpected end of input")]
    UnexpectedEndOfInput,

    /// Bad stream signature (`BZh`) or bad block/footer signature.
    #[error("Invalid magic: {0}")]
    InvalidMagic(String),

    /// The block size digit was not '1'..='9'.
    #[error("Invalid block size: {0:#04x}")]
    InvalidBlockSize(u8),

    /// Malformed header fields, out of range origin pointer, bad cumulative table, bad huffman code.
    #[error("Corrupt stream: {0}")]
    CorruptStream(String),

    /// More symbols were decoded than the block size allows.
    #[error("Block overrun: more than {limit} symbols in a block")]
    BlockOverrun { limit: usize },

    #[error("Block {block} CRC mismatch (expected {expected:08x}, computed {computed:08x})")]
    BlockCrcMismatch {
        block: usize,
        expected: u32,
        computed: u32,
    },

    #[error("Stream CRC mismatch (expected {expected:08x}, computed {computed:08x})")]
    StreamCrcMismatch { expected: u32, computed: u32 },

    /// A previous error left this decoder unusable.
    #[error("Decoder is unusable after an earlier error")]
    Poisoned,
}

impl BzError {
    pub fn corrupt<T: std::fmt::Display>(msg: T) -> Self {
        BzError::CorruptStream(msg.to_string())
    }

    pub fn magic<T: std::fmt::Display>(msg: T) -> Self {
        BzError::InvalidMagic(msg.to_string())
    }
}

impl From<BzError> for io::Error {
    fn from(err: BzError) -> Self {
        match err {
            BzError::Io(e) => e,
            BzError::UnexpectedEndOfInput => {
                io::Error::new(io::ErrorKind::UnexpectedEof, BzError::UnexpectedEndOfInput)
            }
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}

pub type BzResult<T> = Result<T, BzError>;
