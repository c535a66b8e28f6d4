//! Rust version of the standard BZIP2 decompressor.
//!
//! Provides streaming, checksum verified decompression of data in the bzip2 format. `BzDecoder` wraps any
//! `std::io::Read` source and is itself a `Read`, so decompressed bytes are pulled on demand a buffer
//! (or a byte) at a time. Every block CRC and the stream CRC are checked; any mismatch or malformed
//! input is a fatal `BzError`.
//!
//! ```no_run
//! use std::io::Read;
//! use bzip2_reader::BzDecoder;
//!
//! let file = std::fs::File::open("test.txt.bz2").unwrap();
//! let mut text = String::new();
//! BzDecoder::new(file, false).read_to_string(&mut text).unwrap();
//! ```
//!
//! The `bunzip2` binary built from this crate decompresses files from the command line:
//!
//! `$> bunzip2 test.txt.bz2`
//!
//! This will decompress the file and create the file test.txt.
//! The original file will be deleted.
//!
pub mod bitstream;
pub mod decompression;
pub mod error;
pub mod huffman_coding;
pub mod tools;

pub use decompression::decoder::{decompress, BzDecoder, DecoderOptions};
pub use error::{BzError, BzResult};
