//! Inverse Burrows-Wheeler Transform and the per-session block scratch space.
//!
//! The inverse works on the byte frequencies gathered while the symbol stream was decoded. A cumulative
//! count table turns each byte into its row in the sorted rotation matrix, and `tt` links every row to
//! the row holding the following byte of the original data. Walking `tt` from the origin pointer
//! replays the block one byte per step.

use log::{error, trace};

use crate::error::{BzError, BzResult};

/// Reusable decode buffers. Allocated on the first block of a session and only ever grown.
#[derive(Debug)]
pub struct BlockScratch {
    /// Block bytes in BWT order.
    pub(crate) ll8: Vec<u8>,
    /// Count of each byte value in ll8.
    pub(crate) unzftab: [u32; 256],
    cftab: [u32; 257],
    tt: Vec<u32>,
}

impl BlockScratch {
    /// Reserve room for a full block of block_size bytes.
    pub fn new(block_size: usize) -> Self {
        Self {
            ll8: Vec::with_capacity(block_size),
            unzftab: [0; 256],
            cftab: [0; 257],
            tt: Vec::new(),
        }
    }

    /// Clear the byte and frequency tables for the next block, keeping their allocations.
    pub fn reset(&mut self) {
        self.ll8.clear();
        self.unzftab = [0; 256];
    }

    /// Number of bytes in the current block.
    pub fn len(&self) -> usize {
        self.ll8.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ll8.is_empty()
    }

    /// Build the cumulative table and the `tt` links for the current block. Returns the first chain
    /// position, `tt[origin]`.
    pub fn invert(&mut self, origin: usize) -> BzResult<u32> {
        let n = self.ll8.len();
        if origin >= n {
            error!("Origin pointer {} outside a block of {} bytes.", origin, n);
            return Err(BzError::corrupt(format!(
                "origin pointer {} outside block of {} bytes",
                origin, n
            )));
        }

        self.cftab[0] = 0;
        for i in 1..=256 {
            self.cftab[i] = self.cftab[i - 1] + self.unzftab[i - 1];
        }
        if self.cftab.windows(2).any(|w| w[0] > w[1]) || self.cftab[256] as usize > n {
            error!("Cumulative table out of range for {} bytes.", n);
            return Err(BzError::corrupt("invalid cumulative table"));
        }

        // Grow only; a smaller block reuses the front of the existing table.
        if self.tt.len() < n {
            self.tt.resize(n, 0);
        }
        for (i, &byte) in self.ll8.iter().enumerate() {
            let slot = &mut self.cftab[byte as usize];
            self.tt[*slot as usize] = i as u32;
            *slot += 1;
        }
        trace!("Built BWT links for {} bytes, origin {}.", n, origin);
        Ok(self.tt[origin])
    }

    /// One step along the chain: the byte at pos and the position that follows it.
    #[inline]
    pub fn step(&self, pos: u32) -> (u8, u32) {
        (self.ll8[pos as usize], self.tt[pos as usize])
    }

    /// Walk the whole chain from a start position produced by invert().
    pub fn chain(&self, start: u32) -> impl Iterator<Item = u8> + '_ {
        let mut pos = start;
        (0..self.ll8.len()).map(move |_| {
            let (byte, next) = self.step(pos);
            pos = next;
            byte
        })
    }
}
