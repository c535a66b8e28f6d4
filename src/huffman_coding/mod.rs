//! The huffman module rebuilds the decode tables for the Rust version of the standard BZIP2 library.
//!
//! The huffman coding algorithm as used by BZIP2 is both block and chunk oriented. Each block carries
//! one to six coding tables, transmitted only as a code length per symbol. Within each block, chunks of 50
//! symbols are encoded with one of those tables, as named by the block's selector list.
//!
//! Codes are canonical, so the lengths alone are enough to rebuild each table.
//!

pub mod huffman;
