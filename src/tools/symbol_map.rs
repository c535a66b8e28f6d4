use std::io::Read;

use crate::bitstream::bitreader::BitReader;
use crate::error::BzResult;

const BIT_MASK: u16 = 0x8000;

/// Read the two level in-use bitmap from the stream. The first u16 is the index of 16-byte ranges
/// in use; one more u16 follows for every bit set in it.
pub fn read_sym_map<R: Read>(br: &mut BitReader<R>) -> BzResult<Vec<u16>> {
    let index = br.read_bits(16)? as u16;
    let mut maps = Vec::with_capacity(17);
    maps.push(index);
    for _ in 0..index.count_ones() {
        maps.push(br.read_bits(16)? as u16);
    }
    Ok(maps)
}

/// Takes the unique bzip2 symbol map and returns a sorted vec of all
/// u8s used in the block. Position in the vec is the compact symbol index.
pub fn decode_sym_map(symbol_map: &[u16]) -> Vec<u8> {
    /*
    symbol_map[0] marks the presence/absence of ranges of 16 u8s in the block.
    If the first bit of symbol_map[0] is a zero, then none of the u8s from 0-15 were
    present, AND there is no u16 for that range. If the second bit is a one, then at
    least one u8 from 16-31 was present, and the next u16 is the bit map for that range.
    */
    let mut symbols: Vec<u8> = Vec::with_capacity(256);
    let mut map_idx = 0;

    for range in 0..16_u8 {
        if (symbol_map[0] & (BIT_MASK >> range)) > 0 {
            map_idx += 1;
            for byte_idx in 0..16_u8 {
                if (symbol_map[map_idx] & (BIT_MASK >> byte_idx)) > 0 {
                    symbols.push((range << 4) + byte_idx);
                };
            }
        }
    }
    symbols
}
