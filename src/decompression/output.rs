//! Lazy, byte at a time output of one decoded block.
//!
//! The block is fully reconstructed in `BlockScratch`, but its bytes are only produced as the caller asks
//! for them: each step follows one BWT link, undoes the legacy randomization if the block is randomized,
//! and expands the initial run length encoding (four equal bytes are followed by a count of further copies).
//! Every byte handed out goes into the block CRC.

use crate::decompression::bwt::BlockScratch;
use crate::tools::crc::Crc32;
use crate::tools::rand_table::Randomizer;

/// Position of the run length expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitState {
    /// The next byte comes from the BWT chain.
    Chain,
    /// `remaining` more copies of `byte` are owed.
    Repeat { byte: u8, remaining: u8 },
    /// Every byte of the block has been handed out.
    Exhausted,
}

#[derive(Debug)]
pub struct BlockOutput {
    state: EmitState,
    position: u32,
    used: usize,
    len: usize,
    last: Option<u8>,
    same: u8,
    randomizer: Option<Randomizer>,
    crc: Crc32,
    expected_crc: u32,
}

impl BlockOutput {
    /// Start emitting a block of len chain bytes from the chain position returned by BlockScratch::invert().
    pub fn new(start: u32, len: usize, randomized: bool, expected_crc: u32) -> Self {
        Self {
            state: EmitState::Chain,
            position: start,
            used: 0,
            len,
            last: None,
            same: 0,
            randomizer: randomized.then(Randomizer::new),
            crc: Crc32::new(),
            expected_crc,
        }
    }

    /// Next byte of the BWT chain, with the randomization mask applied.
    #[inline]
    fn next_chain_byte(&mut self, scratch: &BlockScratch) -> Option<u8> {
        if self.used == self.len {
            return None;
        }
        let (mut byte, next) = scratch.step(self.position);
        self.position = next;
        self.used += 1;
        if let Some(rand) = self.randomizer.as_mut() {
            byte ^= rand.next_mask();
        }
        Some(byte)
    }

    /// Next output byte, or None once the block is exhausted.
    pub fn next_byte(&mut self, scratch: &BlockScratch) -> Option<u8> {
        loop {
            match self.state {
                EmitState::Repeat { byte, remaining } => {
                    if remaining == 0 {
                        self.state = EmitState::Chain;
                        continue;
                    }
                    self.state = EmitState::Repeat {
                        byte,
                        remaining: remaining - 1,
                    };
                    self.crc.update(byte);
                    return Some(byte);
                }
                EmitState::Chain => {
                    let byte = match self.next_chain_byte(scratch) {
                        Some(byte) => byte,
                        None => {
                            self.state = EmitState::Exhausted;
                            return None;
                        }
                    };
                    // After four equal bytes, the chain byte is a count of extra copies.
                    if self.same == 4 {
                        let run_byte = self.last.unwrap_or_default();
                        self.same = 0;
                        self.last = None;
                        self.state = EmitState::Repeat {
                            byte: run_byte,
                            remaining: byte,
                        };
                        continue;
                    }
                    if self.last == Some(byte) {
                        self.same += 1;
                    } else {
                        self.last = Some(byte);
                        self.same = 1;
                    }
                    self.crc.update(byte);
                    return Some(byte);
                }
                EmitState::Exhausted => return None,
            }
        }
    }

    /// Fill buf as far as the block allows. Returns the number of bytes written.
    pub fn read(&mut self, scratch: &BlockScratch, buf: &mut [u8]) -> usize {
        let mut written = 0;
        while written < buf.len() {
            match self.next_byte(scratch) {
                Some(byte) => {
                    buf[written] = byte;
                    written += 1;
                }
                None => break,
            }
        }
        written
    }

    /// True once no more bytes can come out of this block.
    pub fn is_done(&self) -> bool {
        match self.state {
            EmitState::Exhausted => true,
            EmitState::Chain => self.used == self.len,
            EmitState::Repeat { remaining, .. } => remaining == 0 && self.used == self.len,
        }
    }

    pub fn state(&self) -> EmitState {
        self.state
    }

    pub fn computed_crc(&self) -> u32 {
        self.crc.result()
    }

    pub fn expected_crc(&self) -> u32 {
        self.expected_crc
    }
}
