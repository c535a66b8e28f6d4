//! CRC32 checksums for BZIP2, both block and stream versions.
//!
//! BZIP2 uses the CRC-32 polynomial 0x04c11db7 fed most significant bit first (no reflection), with an
//! initial value and final xor of 0xffffffff.

const POLY: u32 = 0x04c1_1db7;

const CRC_TABLE: [u32; 256] = make_table();

const fn make_table() -> [u32; 256] {
    let mut table = [0_u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u32) << 24;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000_0000 != 0 {
                (crc << 1) ^ POLY
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Byte-wise CRC accumulator, reset at the start of every block.
#[derive(Debug, Clone)]
pub struct Crc32 {
    crc: u32,
}

impl Crc32 {
    pub fn new() -> Self {
        Self { crc: 0xffff_ffff }
    }

    pub fn reset(&mut self) {
        self.crc = 0xffff_ffff;
    }

    #[inline]
    pub fn update(&mut self, byte: u8) {
        self.crc = (self.crc << 8) ^ CRC_TABLE[((self.crc >> 24) as u8 ^ byte) as usize];
    }

    /// Update with the same byte `count` times.
    pub fn update_run(&mut self, byte: u8, count: usize) {
        for _ in 0..count {
            self.update(byte);
        }
    }

    pub fn update_slice(&mut self, data: &[u8]) {
        data.iter().for_each(|&b| self.update(b));
    }

    pub fn result(&self) -> u32 {
        !self.crc
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the block CRC of data, continuing from a previous result (use 0 to start fresh).
pub fn do_crc(prior: u32, data: &[u8]) -> u32 {
    let mut crc = Crc32 { crc: !prior };
    crc.update_slice(data);
    crc.result()
}

/// Folds a block CRC into the running stream CRC.
pub fn do_stream_crc(stream_crc: u32, block_crc: u32) -> u32 {
    stream_crc.rotate_left(1) ^ block_crc
}
