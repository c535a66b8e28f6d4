//! Known good BZIP2 streams for the decoder tests.
//!
//! The stream files under testdata/ were written by libbzip2, except randomized.bz2 which sets the
//! randomized flag on its single block (libbzip2 decodes it back to `sample_text(20_000, 7)`).

/// "AAAAA" at block size 1.
pub const AAAAA: [u8; 39] = [
    0x42, 0x5a, 0x68, 0x31, 0x31, 0x41, 0x59, 0x26, 0x53, 0x59, 0x2e, 0xbd,
    0x67, 0x45, 0x00, 0x00, 0x02, 0x44, 0x00, 0x20, 0x00, 0x20, 0x00, 0x20,
    0x00, 0x21, 0x00, 0x82, 0x0b, 0x17, 0x72, 0x45, 0x38, 0x50, 0x90, 0x2e,
    0xbd, 0x67, 0x45,
];

/// A stream with no blocks at all.
pub const EMPTY: [u8; 14] = [
    0x42, 0x5a, 0x68, 0x31, 0x17, 0x72, 0x45, 0x38, 0x50, 0x90, 0x00, 0x00,
    0x00, 0x00,
];

/// "hello, hello, hello world\n" at block size 9.
pub const HELLO: [u8; 54] = [
    0x42, 0x5a, 0x68, 0x39, 0x31, 0x41, 0x59, 0x26, 0x53, 0x59, 0xcc, 0x2e,
    0x03, 0xa1, 0x00, 0x00, 0x06, 0x51, 0x80, 0x00, 0x10, 0x40, 0x04, 0x06,
    0x44, 0x90, 0x80, 0x20, 0x00, 0x21, 0x90, 0x32, 0x04, 0x00, 0xc2, 0xa8,
    0x32, 0xd9, 0x41, 0x6e, 0x9c, 0x07, 0x9a, 0xf1, 0x77, 0x24, 0x53, 0x85,
    0x09, 0x0c, 0xc2, 0xe0, 0x3a, 0x10,
];

pub const HELLO_TEXT: &[u8] = b"hello, hello, hello world\n";

/// `sample_text(600_000, 1)` at block size 1: three blocks.
pub const MULTI_BLOCK: &[u8] = include_bytes!("../../testdata/multi_block.bz2");

/// AAAAA, then EMPTY, then `sample_text(3_000, 2)` at block size 9, concatenated.
pub const MULTI_STREAM: &[u8] = include_bytes!("../../testdata/multi_stream.bz2");

/// `sample_text(20_000, 7)` in one randomized block.
pub const RANDOMIZED: &[u8] = include_bytes!("../../testdata/randomized.bz2");

const WORDS: [&[u8]; 8] = [
    b"the ", b"quick ", b"brown ", b"fox ", b"jumps ", b"over ", b"lazy ", b"dogs\n",
];

/// Deterministic test text: words, runs of '-' and arbitrary bytes picked by a simple LCG.
pub fn sample_text(len: usize, seed: u32) -> Vec<u8> {
    let mut x = seed;
    let mut out = Vec::with_capacity(len + 300);
    while out.len() < len {
        x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345) & 0x7fff_ffff;
        match (x >> 16) % 64 {
            pick @ 0..=7 => out.extend_from_slice(WORDS[pick as usize]),
            8 => out.extend(std::iter::repeat(b'-').take(((x >> 4) % 300) as usize)),
            _ => out.push((x >> 8) as u8),
        }
    }
    out.truncate(len);
    out
}

#[test]
fn sample_text_is_stable() {
    assert_eq!(&sample_text(40, 1)[..8], &[108, 97, 122, 121, 32, 176, 113, 117]);
    assert_eq!(sample_text(600_000, 1).len(), 600_000);
}
