//! Stream and block header parsing.
//!
//! A stream opens with `BZh` and a block size digit. Each block then opens with a 48 bit magic number,
//! followed by the block CRC, the randomized flag, the BWT origin pointer, the symbol map, the selectors
//! and the huffman code lengths. The stream closes with a different 48 bit magic and the stream CRC.

use std::io::Read;

use log::{debug, error, info, trace, warn};

use crate::bitstream::bitreader::BitReader;
use crate::error::{BzError, BzResult};
use crate::huffman_coding::huffman::{HuffmanTable, MAX_CODE_LEN};
use crate::tools::mtf::undo_selector_mtf;
use crate::tools::symbol_map::{decode_sym_map, read_sym_map};

pub const STREAM_MAGIC: &[u8; 3] = b"BZh";
pub const BLOCK_MAGIC: u64 = 0x3141_5926_5359;
pub const EOS_MAGIC: u64 = 0x1772_4538_5090;
pub const BLOCK_SIZE_MULTIPLE: usize = 100_000;
/// Symbols coded with one table before consulting the next selector.
pub const CHUNK_SIZE: usize = 50;
pub const MAX_GROUPS: usize = 6;
/// Selectors beyond this are read but ignored.
pub const MAX_SELECTORS: usize = 2 + 900_000 / CHUNK_SIZE;

/// Everything needed to decode the symbol stream of one block.
#[derive(Debug)]
pub struct BlockHeader {
    pub block_crc: u32,
    pub randomized: bool,
    /// BWT origin pointer.
    pub origin: usize,
    /// Compact symbol index to byte value.
    pub symbols: Vec<u8>,
    /// Coding table for each chunk of CHUNK_SIZE symbols.
    pub selectors: Vec<u8>,
    pub tables: Vec<HuffmanTable>,
}

impl BlockHeader {
    /// Alphabet size: every byte in use plus RUNA, RUNB and EOB, less the byte folded into RUNA/RUNB.
    pub fn alpha_size(&self) -> usize {
        self.symbols.len() + 2
    }

    /// End of block symbol.
    pub fn eob(&self) -> u16 {
        self.symbols.len() as u16 + 1
    }
}

/// What follows the previous block: another block, or the end of the stream.
#[derive(Debug)]
pub enum BlockStart {
    Block(BlockHeader),
    EndOfStream { stream_crc: u32 },
}

/// Read `BZh` and the block size digit. Returns the block capacity in bytes (digit * 100,000).
pub fn read_stream_header<R: Read>(br: &mut BitReader<R>) -> BzResult<usize> {
    for &expected in STREAM_MAGIC {
        let found = br.read_u8()?;
        if found != expected {
            error!(
                "Fatal error: expected {:?} in the stream signature, found {:#04x}.",
                expected as char, found
            );
            return Err(BzError::magic(format!(
                "not a bzip2 stream (expected {:?}, found {:#04x})",
                expected as char, found
            )));
        }
    }
    let digit = br.read_u8()?;
    if !(b'1'..=b'9').contains(&digit) {
        error!("Fatal error: Found invalid block size {:#04x}.", digit);
        return Err(BzError::InvalidBlockSize(digit));
    }
    let block_size = (digit - b'0') as usize * BLOCK_SIZE_MULTIPLE;
    info!("Found a valid bzip2 signature, block size {}.", block_size);
    Ok(block_size)
}

/// Read the next block magic and, for a data block, the rest of the block header.
pub fn read_block_start<R: Read>(
    br: &mut BitReader<R>,
    block_size: usize,
    block_no: usize,
) -> BzResult<BlockStart> {
    let magic = (br.read_bits(24)? as u64) << 24 | br.read_bits(24)? as u64;
    if magic == EOS_MAGIC {
        let stream_crc = br.read_u32()?;
        debug!("Found the stream footer, stream CRC {:08x}.", stream_crc);
        return Ok(BlockStart::EndOfStream { stream_crc });
    }
    if magic != BLOCK_MAGIC {
        error!("Invalid block header {:012x} at {}.", magic, br.loc());
        return Err(BzError::magic(format!("bad block header {:012x}", magic)));
    }

    let block_crc = br.read_u32()?;
    let randomized = br.read_bit()?;
    if randomized {
        warn!("Block {} is randomized.", block_no);
    }

    let origin = br.read_bits(24)? as usize;
    if origin > block_size + 10 {
        error!("Invalid origin pointer {} in block {}.", origin, block_no);
        return Err(BzError::corrupt(format!("origin pointer {} out of range", origin)));
    }

    let symbols = decode_sym_map(&read_sym_map(br)?);
    if symbols.is_empty() {
        error!("Block {} uses no symbols.", block_no);
        return Err(BzError::corrupt("empty symbol map"));
    }
    let alpha_size = symbols.len() + 2;

    let table_count = br.read_bits(3)? as usize;
    if !(1..=MAX_GROUPS).contains(&table_count) {
        error!("Invalid table count {}.", table_count);
        return Err(BzError::corrupt(format!("table count {}", table_count)));
    }

    let selectors = read_selectors(br, table_count)?;
    let tables = (0..table_count)
        .map(|_| HuffmanTable::build(&read_code_lengths(br, alpha_size)?))
        .collect::<BzResult<Vec<_>>>()?;

    debug!(
        "Block {}: crc {:08x}, origin {}, {} symbols, {} tables, {} selectors.",
        block_no,
        block_crc,
        origin,
        symbols.len(),
        table_count,
        selectors.len()
    );
    Ok(BlockStart::Block(BlockHeader {
        block_crc,
        randomized,
        origin,
        symbols,
        selectors,
        tables,
    }))
}

/// Read the unary coded, move to front encoded selector list.
fn read_selectors<R: Read>(br: &mut BitReader<R>, table_count: usize) -> BzResult<Vec<u8>> {
    let selector_count = br.read_bits(15)? as usize;
    if selector_count == 0 {
        error!("Found no selectors.");
        return Err(BzError::corrupt("no selectors"));
    }
    if selector_count > MAX_SELECTORS {
        warn!(
            "{} selectors were reported, but the maximum is {}. Ignoring the excess.",
            selector_count, MAX_SELECTORS
        );
    }

    let mut raw = Vec::with_capacity(selector_count.min(MAX_SELECTORS));
    for _ in 0..selector_count {
        let mut group = 0_usize;
        while br.read_bit()? {
            group += 1;
            if group >= table_count {
                error!("Selector index past {} tables at {}.", table_count, br.loc());
                return Err(BzError::corrupt("selector out of range"));
            }
        }
        if raw.len() < MAX_SELECTORS {
            raw.push(group as u8);
        }
    }
    undo_selector_mtf(&raw, table_count)
}

/// Read one table's delta coded code lengths: a 5 bit start, then per symbol a run of
/// (1, sign) pairs closed by a 0. Sign 0 adds one, sign 1 subtracts one.
fn read_code_lengths<R: Read>(br: &mut BitReader<R>, alpha_size: usize) -> BzResult<Vec<u8>> {
    let mark_loc = br.loc();
    let mut len = br.read_bits(5)? as i32;
    let mut lengths = Vec::with_capacity(alpha_size);
    for symbol in 0..alpha_size {
        loop {
            if len < 1 || len > MAX_CODE_LEN as i32 {
                error!("Code length of {} for symbol {}.", len, symbol);
                return Err(BzError::corrupt(format!("code length {}", len)));
            }
            if !br.read_bit()? {
                break;
            }
            if br.read_bit()? {
                len -= 1
            } else {
                len += 1
            }
        }
        lengths.push(len as u8);
    }
    trace!("Found huffman code lengths at {}: {:?}", mark_loc, lengths);
    Ok(lengths)
}
