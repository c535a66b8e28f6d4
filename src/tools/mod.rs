//! The tools module provides several helper functions for the Rust version of the standard BZIP2 library.
//!
//! BZIP2 is a block-oriented approach to compress data.
//!
//! The tools are:
//! - cli: Command line interface for bunzip2.
//! - crc: CRC32 checksum for BZIP2, both block and stream versions.
//! - mtf: Move-To-Front list for the symbol stream and the selectors.
//! - rand_table: Table and generator for undoing legacy block randomization.
//! - rle2_mtf_decode: Huffman symbol decoding with Run-Length-Encoding phase 2 and Move-To-Front undone (integrated for speed).
//! - symbol_map: Decode the symbol map used in BZIP2.
//!
pub mod cli;
pub mod crc;
pub mod mtf;
pub mod rand_table;
pub mod rle2_mtf_decode;
pub mod symbol_map;
