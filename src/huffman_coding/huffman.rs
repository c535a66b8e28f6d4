use std::io::Read;

use log::{error, trace};

use crate::bitstream::bitreader::BitReader;
use crate::error::{BzError, BzResult};

/// Largest alphabet: 256 byte values plus RUNA/RUNB, less the one value folded into RUNA/RUNB, plus EOB.
pub const MAX_ALPHA_SIZE: usize = 258;
/// Longest code length the bzip2 format allows.
pub const MAX_CODE_LEN: u32 = 20;
// base/limit are indexed by code length, and base also by length + 1 during construction.
const TABLE_LEN: usize = MAX_CODE_LEN as usize + 2;

/// Canonical huffman decode table for one coding group.
///
/// `perm` holds the symbols sorted by code length, then by symbol value. `limit[len]` is the largest
/// code value of that length (or -1 when there is none) and `base[len]` is the offset that maps a code
/// of that length onto its position in `perm`. No explicit code to symbol map is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTable {
    limit: [i32; TABLE_LEN],
    base: [i32; TABLE_LEN],
    perm: Vec<u16>,
    min_len: u32,
    max_len: u32,
}

impl HuffmanTable {
    /// Build the decode table from the code length of every symbol in the alphabet.
    pub fn build(lengths: &[u8]) -> BzResult<Self> {
        if lengths.is_empty() || lengths.len() > MAX_ALPHA_SIZE {
            error!("Huffman table built for {} symbols.", lengths.len());
            return Err(BzError::corrupt(format!(
                "huffman alphabet of {} symbols",
                lengths.len()
            )));
        }
        if let Some(&bad) = lengths
            .iter()
            .find(|&&len| len == 0 || len as u32 > MAX_CODE_LEN)
        {
            error!("Found a code length of {}.", bad);
            return Err(BzError::corrupt(format!("code length {} out of range", bad)));
        }

        // Both exist because lengths is not empty.
        let min_len = lengths.iter().copied().min().unwrap_or(1) as u32;
        let max_len = lengths.iter().copied().max().unwrap_or(1) as u32;

        // Sort the symbols by length. A stable sort keeps equal lengths in symbol order.
        let mut perm: Vec<u16> = (0..lengths.len() as u16).collect();
        perm.sort_by_key(|&sym| lengths[sym as usize]);

        // Count the codes of each length, shifted up by one, then turn the counts into running totals.
        // base[len] is now the number of codes shorter than len.
        let mut base = [0_i32; TABLE_LEN];
        for &len in lengths {
            base[len as usize + 1] += 1;
        }
        for i in 1..TABLE_LEN {
            base[i] += base[i - 1];
        }

        // Canonical codes: each length continues from the last code of the previous length, shifted left.
        let mut limit = [-1_i32; TABLE_LEN];
        let mut code = 0_i32;
        for len in min_len as usize..=max_len as usize {
            code += base[len + 1] - base[len];
            limit[len] = code - 1;
            code <<= 1;
        }
        for len in min_len as usize + 1..=max_len as usize {
            base[len] = ((limit[len - 1] + 1) << 1) - base[len];
        }

        trace!(
            "Built huffman table for {} symbols, lengths {}..={}.",
            lengths.len(),
            min_len,
            max_len
        );
        Ok(Self {
            limit,
            base,
            perm,
            min_len,
            max_len,
        })
    }

    /// Decode one symbol: start with min_len bits and extend a bit at a time while the code is past
    /// the limit for its length.
    pub fn decode<R: Read>(&self, br: &mut BitReader<R>) -> BzResult<u16> {
        let mut len = self.min_len;
        let mut code = br.read_bits(len)? as i32;
        while code > self.limit[len as usize] {
            len += 1;
            if len > self.max_len {
                error!("Huffman code ran past {} bits at {}.", self.max_len, br.loc());
                return Err(BzError::corrupt("invalid huffman code"));
            }
            code = (code << 1) | br.read_bit()? as i32;
        }
        let index = code - self.base[len as usize];
        if index < 0 || index as usize >= self.perm.len() {
            error!("Huffman code {} of length {} has no symbol.", code, len);
            return Err(BzError::corrupt("invalid huffman code"));
        }
        Ok(self.perm[index as usize])
    }

    pub fn min_len(&self) -> u32 {
        self.min_len
    }

    pub fn max_len(&self) -> u32 {
        self.max_len
    }

    pub fn perm(&self) -> &[u16] {
        &self.perm
    }
}
