//! Huffman decoding of a block's symbols, undoing RLE2 and the Move-To-Front transform on the way.

use std::io::BufRead;

use log::trace;

use crate::bitstream::bitreader::BitReader;
use crate::decompression::block_header::{BlockHeader, CHUNK_SIZE};
use crate::decompression::error::{DecodeError, Result};

const RUNA: u16 = 0;
const RUNB: u16 = 1;
/// A run weight this large can only come from corrupt data.
const ZERO_BOMB: usize = 2 * 1024 * 1024;

/// Huffman decode the block data and undo RLE2 and the MTF transform in one pass.
///
/// The pre-BWT bytes land in the low 8 bits of `tt` (cleared first, capacity kept). Returns
/// the frequency count of every byte value, which the inverse BWT needs.
pub fn rle2_mtf_decode<R: BufRead>(
    br: &mut BitReader<R>,
    header: &BlockHeader,
    tt: &mut Vec<u32>,
    capacity: usize,
) -> Result<[u32; 256]> {
    tt.clear();
    tt.reserve(capacity);
    let mut freqs = [0_u32; 256];

    // The MTF list holds byte values directly. The alphabet never exceeds 256 so a flat
    // array with shifting is fast enough.
    let mut mtf_index = header.symbol_set.clone();
    let eob = header.eob();

    // Initialize counters
    let mut zeros = 0_usize;
    let mut bit_multiplier = 1_usize;
    let mut selector = 0_usize;
    let mut chunk_left = 0_usize;
    let mut table = &header.tables[0];

    loop {
        // Switch tables at the start of each chunk of 50 symbols.
        if chunk_left == 0 {
            let &group = header.selectors.get(selector).ok_or_else(|| {
                DecodeError::InvalidSelectors(format!(
                    "ran out of selectors after {} chunks",
                    selector
                ))
            })?;
            table = &header.tables[group as usize];
            selector += 1;
            chunk_left = CHUNK_SIZE;
        }
        chunk_left -= 1;

        let symbol = table.decode(br)?;
        match symbol {
            // RUNA and RUNB spell out a bijective base 2 count of zeros (front of the MTF list)
            RUNA | RUNB => {
                if bit_multiplier >= ZERO_BOMB {
                    return Err(DecodeError::UnexpectedEndOfBlock(capacity));
                }
                zeros += bit_multiplier << symbol;
                bit_multiplier <<= 1;
            }
            // Found a "normal" symbol or EOB
            n => {
                // Output zero data, if any
                if zeros > 0 {
                    if tt.len() + zeros > capacity {
                        return Err(DecodeError::UnexpectedEndOfBlock(capacity));
                    }
                    let byte = mtf_index[0];
                    freqs[byte as usize] += zeros as u32;
                    tt.resize(tt.len() + zeros, byte as u32);
                    bit_multiplier = 1;
                    zeros = 0;
                }

                if n == eob {
                    break;
                }

                if tt.len() >= capacity {
                    return Err(DecodeError::UnexpectedEndOfBlock(capacity));
                }

                // Then output the symbol (MTF location is one less than n) and move it to the front.
                let loc = n as usize - 1;
                let byte = mtf_index[loc];
                mtf_index.copy_within(0..loc, 1);
                mtf_index[0] = byte;

                freqs[byte as usize] += 1;
                tt.push(byte as u32);
            }
        }
    }

    trace!(
        "Decoded {} bytes using {} selectors, ending at {}.",
        tt.len(),
        selector,
        br.loc()
    );
    Ok(freqs)
}
