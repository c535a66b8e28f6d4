use std::io::Read;

use log::{error, trace};

use crate::bitstream::bitreader::BitReader;
use crate::decompression::block_header::{BlockHeader, CHUNK_SIZE};
use crate::decompression::bwt::BlockScratch;
use crate::error::{BzError, BzResult};
use crate::tools::mtf::MtfList;

const RUNA: u16 = 0;
const RUNB: u16 = 1;

/// Decode the huffman coded symbol stream of one block, undoing RLE2 and the Move-To-Front transform.
///
/// Bytes land in `scratch.ll8` (in BWT order) and their counts in `scratch.unzftab`. The coding table
/// switches every CHUNK_SIZE symbols as named by the selectors. Decoding stops at the EOB symbol.
/// Returns the number of bytes in the block.
pub fn rle2_mtf_decode<R: Read>(
    br: &mut BitReader<R>,
    header: &BlockHeader,
    scratch: &mut BlockScratch,
    limit: usize,
) -> BzResult<usize> {
    scratch.reset();
    let eob = header.eob();
    let mut mtf = MtfList::new();

    // RUNA/RUNB accumulate a bijective base 2 count of repeats of the byte at the front of the MTF list.
    let mut zeros = 0_usize;
    let mut bit_multiplier = 1_usize;
    let mut decoded = 0_usize;
    let mut table = &header.tables[0];

    loop {
        if decoded % CHUNK_SIZE == 0 {
            let chunk = decoded / CHUNK_SIZE;
            let selector = match header.selectors.get(chunk) {
                Some(&selector) => selector,
                None => {
                    error!(
                        "Ran out of selectors after {} chunks at {}.",
                        header.selectors.len(),
                        br.loc()
                    );
                    return Err(BzError::corrupt("ran out of selectors before end of block"));
                }
            };
            table = &header.tables[selector as usize];
        }
        let symbol = table.decode(br)?;
        decoded += 1;

        match symbol {
            RUNA | RUNB => {
                zeros += bit_multiplier << symbol;
                bit_multiplier <<= 1;
                if zeros > limit {
                    return Err(overrun(limit));
                }
            }
            n => {
                // Output the pending run, if any. The run repeats the front byte without moving it.
                if zeros > 0 {
                    if scratch.ll8.len() + zeros > limit {
                        return Err(overrun(limit));
                    }
                    let byte = header.symbols[mtf.front() as usize];
                    scratch
                        .ll8
                        .extend(std::iter::repeat(byte).take(zeros));
                    scratch.unzftab[byte as usize] += zeros as u32;
                    zeros = 0;
                    bit_multiplier = 1;
                }

                if n == eob {
                    break;
                }

                // Then output the symbol (location is one less than n) and move it to the front.
                if scratch.ll8.len() >= limit {
                    return Err(overrun(limit));
                }
                let byte = header.symbols[mtf.take(n as usize - 1) as usize];
                scratch.ll8.push(byte);
                scratch.unzftab[byte as usize] += 1;
            }
        }
    }

    trace!(
        "Decoded {} symbols into {} bytes at {}.",
        decoded,
        scratch.len(),
        br.loc()
    );
    Ok(scratch.len())
}

fn overrun(limit: usize) -> BzError {
    error!("Block overrun: more than {} bytes.", limit);
    BzError::BlockOverrun { limit }
}
