//! Block magic and block header parsing: CRC, origin pointer, symbol map, selectors and code lengths.

use std::io::BufRead;

use log::{debug, trace, warn};

use crate::bitstream::bitreader::BitReader;
use crate::decompression::error::{DecodeError, Result};
use crate::huffman_coding::huffman::{HuffmanTable, MAX_CODE_LEN};
use crate::tools::symbol_map::read_sym_map;

pub const HEADER: [u8; 6] = [0x31, 0x41, 0x59, 0x26, 0x53, 0x59];
pub const FOOTER: [u8; 6] = [0x17, 0x72, 0x45, 0x38, 0x50, 0x90];
/// Symbols coded with one huffman table before the next selector applies.
pub const CHUNK_SIZE: usize = 50;
/// Most selectors a 900k block can need. Any beyond this are read and thrown away.
pub const MAX_SELECTORS: usize = 2 + 900_000 / CHUNK_SIZE;

/// What the next 48 bits of the stream announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Block,
    EndOfStream,
}

/// Read a block header or stream footer magic.
pub fn read_marker<R: BufRead>(br: &mut BitReader<R>) -> Result<Marker> {
    let magic = br.bytes(6)?;
    if magic == HEADER {
        Ok(Marker::Block)
    } else if magic == FOOTER {
        Ok(Marker::EndOfStream)
    } else {
        Err(DecodeError::BadBlockMagic(
            magic.iter().fold(0_u64, |acc, &b| acc << 8 | b as u64),
        ))
    }
}

/// Everything in a block ahead of the huffman coded data.
#[derive(Debug, Clone)]
pub struct BlockHeader {
    pub block_crc: u32,
    /// Legacy randomization flag - should almost always be false.
    pub randomized: bool,
    /// Row of the original data in the sorted BWT matrix.
    pub orig_ptr: usize,
    /// Byte values in use, in order (dense symbol index -> byte).
    pub symbol_set: Vec<u8>,
    /// Huffman table used for each chunk of 50 symbols, already un-MTF'd.
    pub selectors: Vec<u8>,
    pub tables: Vec<HuffmanTable>,
}

impl BlockHeader {
    /// Parse the header of a block whose magic has already been read. `capacity` is the
    /// stream's block size in bytes.
    pub fn parse<R: BufRead>(br: &mut BitReader<R>, capacity: usize) -> Result<Self> {
        let block_crc = br.bint32()?;
        trace!("Block CRC is {:#010x}.", block_crc);

        let randomized = br.bool_bit()?;
        if randomized {
            debug!("Block uses legacy randomization.");
        }

        // Get key (origin pointer)
        let orig_ptr = br.bint(24)? as usize;
        if orig_ptr > capacity + 10 {
            return Err(DecodeError::InvalidOrigPtr {
                orig_ptr,
                len: capacity,
            });
        }

        let symbol_set = read_sym_map(br)?;
        if symbol_set.is_empty() {
            return Err(DecodeError::InvalidGroupCount(
                "symbol map has no bytes in use".to_string(),
            ));
        }
        // RUNA and RUNB replace MTF value 0, and EOB is added at the end.
        let alpha_size = symbol_set.len() + 2;

        let table_count = br.bint(3)? as usize;
        if !(2..=6).contains(&table_count) {
            return Err(DecodeError::InvalidGroupCount(format!(
                "{} huffman tables",
                table_count
            )));
        }

        let selectors = read_selectors(br, table_count)?;

        let mut tables = Vec::with_capacity(table_count);
        for table in 0..table_count {
            let mark_loc = br.loc();
            let lengths = read_code_lengths(br, alpha_size)?;
            tables.push(HuffmanTable::from_lengths(&lengths)?);
            trace!("Found huffman table {} at {}.", table, mark_loc);
        }

        debug!(
            "Block has {} symbols, {} tables and {} selectors.",
            alpha_size,
            table_count,
            selectors.len()
        );

        Ok(Self {
            block_crc,
            randomized,
            orig_ptr,
            symbol_set,
            selectors,
            tables,
        })
    }

    /// The end of block symbol.
    pub fn eob(&self) -> u16 {
        self.symbol_set.len() as u16 + 1
    }
}

/// Read the unary coded selectors and undo their move-to-front coding.
fn read_selectors<R: BufRead>(br: &mut BitReader<R>, table_count: usize) -> Result<Vec<u8>> {
    let selector_count = br.bint(15)? as usize;
    if selector_count == 0 {
        return Err(DecodeError::InvalidSelectors("no selectors".to_string()));
    }
    if selector_count > MAX_SELECTORS {
        warn!(
            "Found {} selectors, but the maximum is {}. Ignoring the extras.",
            selector_count, MAX_SELECTORS
        );
    }

    // Create an index vec for the number of tables we need
    let mut table_idx: Vec<u8> = (0..table_count as u8).collect();
    let mut selectors = Vec::with_capacity(selector_count.min(MAX_SELECTORS));

    for i in 0..selector_count {
        let mut idx = 0;
        while br.bool_bit()? {
            idx += 1;
            if idx >= table_count {
                return Err(DecodeError::InvalidSelectors(format!(
                    "selector {} names table {} of {}",
                    i, idx, table_count
                )));
            }
        }
        // Like Julian, only keep the selectors that can be used.
        if i >= MAX_SELECTORS {
            continue;
        }
        // Save the table from the MTF index, then move it to the front.
        let table = table_idx[idx];
        table_idx.copy_within(0..idx, 1);
        table_idx[0] = table;
        selectors.push(table);
    }
    Ok(selectors)
}

/// Read one table's delta coded symbol lengths.
fn read_code_lengths<R: BufRead>(br: &mut BitReader<R>, alpha_size: usize) -> Result<Vec<u8>> {
    let mut lengths = vec![0_u8; alpha_size];
    // Read the origin length - five bits long
    let mut l = br.bint(5)? as i32;
    for length in lengths.iter_mut() {
        // Look for offset pairs: "10" adds one, "11" subtracts one, "0" ends this symbol.
        loop {
            if l < 1 || l > MAX_CODE_LEN as i32 {
                return Err(DecodeError::InvalidHuffmanTable(format!(
                    "code length {} outside 1..={}",
                    l, MAX_CODE_LEN
                )));
            }
            if !br.bool_bit()? {
                break;
            }
            if br.bool_bit()? {
                l -= 1
            } else {
                l += 1
            }
        }
        *length = l as u8;
    }
    Ok(lengths)
}

#[cfg(test)]
mod test {
    use super::*;

    /// bzip2 -9 of "hello"
    const HELLO: [u8; 41] = [
        0x42, 0x5a, 0x68, 0x39, 0x31, 0x41, 0x59, 0x26, 0x53, 0x59, 0x19, 0x31, 0x65, 0x3d, 0x00,
        0x00, 0x00, 0x81, 0x00, 0x02, 0x44, 0xa0, 0x00, 0x21, 0x9a, 0x68, 0x33, 0x4d, 0x07, 0x33,
        0x8b, 0xb9, 0x22, 0x9c, 0x28, 0x48, 0x0c, 0x98, 0xb2, 0x9e, 0x80,
    ];

    #[test]
    fn marker_test() {
        let mut br = BitReader::new(&HELLO[4..]);
        assert_eq!(read_marker(&mut br).unwrap(), Marker::Block);

        let mut br = BitReader::new(FOOTER.as_slice());
        assert_eq!(read_marker(&mut br).unwrap(), Marker::EndOfStream);

        let bad = [0x31, 0x41, 0x59, 0x26, 0x53, 0x58];
        let mut br = BitReader::new(bad.as_slice());
        assert!(matches!(
            read_marker(&mut br),
            Err(DecodeError::BadBlockMagic(0x3141_5926_5358))
        ));
    }

    #[test]
    fn parse_hello_header_test() {
        let mut br = BitReader::new(&HELLO[4..]);
        assert_eq!(read_marker(&mut br).unwrap(), Marker::Block);
        let header = BlockHeader::parse(&mut br, 900_000).unwrap();
        assert_eq!(header.block_crc, 0x1931_653d);
        assert!(!header.randomized);
        assert_eq!(header.orig_ptr, 1);
        assert_eq!(header.symbol_set, b"ehlo".to_vec());
        assert_eq!(header.eob(), 5);
        assert_eq!(header.tables.len(), 2);
        assert_eq!(header.selectors, vec![0]);
    }

    #[test]
    fn selector_mtf_test() {
        // 15 bit count of 5, then five selectors over three tables with MTF values 0, 1, 1, 2, 0
        // unary: 0 | 10 | 10 | 110 | 0
        let data = [0b0000_0000, 0b0000_1010, 0b1010_1100];
        let mut br = BitReader::new(data.as_slice());
        let selectors = read_selectors(&mut br, 3).unwrap();
        // list [0,1,2]: 0 -> 0 [0,1,2]; 1 -> 1 [1,0,2]; 1 -> 0 [0,1,2]; 2 -> 2 [2,0,1]; 0 -> 2
        assert_eq!(selectors, vec![0, 1, 0, 2, 2]);
    }

    #[test]
    fn selector_out_of_range_test() {
        // One selector with MTF value 2 for only two tables.
        // 15 bit count of 1, then 110
        let data = [0b0000_0000, 0b0000_0011, 0b1000_0000];
        let mut br = BitReader::new(data.as_slice());
        assert!(matches!(
            read_selectors(&mut br, 2),
            Err(DecodeError::InvalidSelectors(_))
        ));
    }

    #[test]
    fn selector_overflow_test() {
        // 15 bit count of 18003, then 18003 selectors of MTF value 0.
        let mut data = vec![0_u8; 2260];
        data[0] = 0x8c;
        data[1] = 0xa6;
        let mut br = BitReader::new(data.as_slice());
        let selectors = read_selectors(&mut br, 2).unwrap();
        assert_eq!(selectors.len(), MAX_SELECTORS);
        assert!(selectors.iter().all(|&s| s == 0));
        // The extra selector is still read: 15 + 18003 bits.
        assert_eq!(br.loc(), "[2252.2]");
    }

    #[test]
    fn zero_selectors_test() {
        let data = [0_u8, 0];
        let mut br = BitReader::new(data.as_slice());
        assert!(matches!(
            read_selectors(&mut br, 2),
            Err(DecodeError::InvalidSelectors(_))
        ));
    }

    #[test]
    fn code_lengths_test() {
        // Start at 3; sym0: 0 -> 3; sym1: 10 0 -> 4; sym2: 11 11 0 -> 2
        // 00011 0 100 11110 + pad
        let data = [0b0001_1010, 0b0111_1000];
        let mut br = BitReader::new(data.as_slice());
        assert_eq!(read_code_lengths(&mut br, 3).unwrap(), vec![3, 4, 2]);
    }

    #[test]
    fn code_length_out_of_range_test() {
        // Start at 1 and step down to 0.
        let data = [0b0000_1110, 0b0000_0000];
        let mut br = BitReader::new(data.as_slice());
        assert!(matches!(
            read_code_lengths(&mut br, 3),
            Err(DecodeError::InvalidHuffmanTable(_))
        ));
    }

    #[test]
    fn empty_symbol_map_test() {
        // crc, not randomized, orig_ptr 0, empty symbol map
        let mut data = vec![0_u8; 4];
        data.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
        let mut br = BitReader::new(data.as_slice());
        assert!(matches!(
            BlockHeader::parse(&mut br, 100_000),
            Err(DecodeError::InvalidGroupCount(_))
        ));
    }
}
