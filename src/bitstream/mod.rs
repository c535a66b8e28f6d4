//! The bitstream module forms the I/O subsystem for the Rust version of the standard BZIP2 library.
//!
//! BZIP2 packs its headers, tables and huffman codes as a continuous stream of bits, most significant bit first,
//! with no byte alignment between fields. Only the start of a stream is byte aligned.
//!
//! This I/O subsystem is designed to efficiently interface with the other modules within BZIP2. It is not intended for
//! more general use.
//!
pub mod bitreader;
