//! The decompression module drives the decoding of a BZIP2 stream.
//!
//! - block_header: stream signature, block headers and the end of stream footer.
//! - bwt: inverse Burrows-Wheeler Transform over the reusable block scratch space.
//! - output: lazy emission of a decoded block, with de-randomization, run expansion and the block CRC.
//! - decoder: `BzDecoder`, the public read interface tying the pieces together.
//!
pub mod block_header;
pub mod bwt;
pub mod decoder;
pub mod output;

#[cfg(test)]
pub mod test_streams;
