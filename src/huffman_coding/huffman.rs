//! Canonical huffman decode tables for BZIP2.
//!
//! Each block carries between two and six code length tables. The codes themselves are never
//! stored: codes of the same length are consecutive integers, and shorter codes sort before
//! longer ones, so the lengths alone are enough to rebuild the decoder.
//!
//! Decoding reads bits one at a time. After `len` bits the running code is valid for this
//! length when it is no greater than `limit[len]`, and `code - base[len]` then indexes the
//! symbols sorted by (length, symbol).

use std::io::BufRead;

use log::trace;

use crate::bitstream::bitreader::BitReader;
use crate::decompression::error::{DecodeError, Result};

/// Longest code BZIP2 allows.
pub const MAX_CODE_LEN: u32 = 20;
/// Symbols in the largest alphabet: 256 MTF values, RUNA/RUNB and EOB.
pub const MAX_ALPHA_SIZE: usize = 258;

const TABLE_LEN: usize = MAX_CODE_LEN as usize + 2;

#[derive(Debug, Clone)]
pub struct HuffmanTable {
    /// Largest code of each length, or -1 when there are none.
    limit: [i32; TABLE_LEN],
    /// Code value minus perm index, per length.
    base: [i32; TABLE_LEN],
    /// Symbols sorted by code length, ties in symbol order.
    perm: Vec<u16>,
    min_len: u32,
    max_len: u32,
}

impl HuffmanTable {
    /// Build the decode table from the code length of every symbol in the alphabet.
    pub fn from_lengths(lengths: &[u8]) -> Result<Self> {
        validate_lengths(lengths)?;

        // Pair each symbol with its length. A stable sort by length keeps symbols of equal
        // length in symbol order, which is exactly the canonical code order.
        let mut map: Vec<(u16, u32)> = lengths
            .iter()
            .enumerate()
            .map(|(symbol, &len)| (symbol as u16, len as u32))
            .collect();
        map.sort_by(|a, b| a.1.cmp(&b.1));

        let min_len = map[0].1;
        let max_len = map[map.len() - 1].1;
        let perm = map.iter().map(|(s, _)| *s).collect::<Vec<u16>>();

        // Count the codes of each length, offset by one so a running sum gives the perm index
        // of the first code of each length.
        let mut base = [0_i32; TABLE_LEN];
        for &(_, len) in &map {
            base[len as usize + 1] += 1;
        }
        for i in 1..TABLE_LEN {
            base[i] += base[i - 1];
        }

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

        Ok(Self {
            limit,
            base,
            perm,
            min_len,
            max_len,
        })
    }

    /// Read one symbol from the bitstream.
    pub fn decode<R: BufRead>(&self, br: &mut BitReader<R>) -> Result<u16> {
        let mut len = self.min_len as usize;
        let mut code = br.bint(len)? as i32;
        loop {
            if code <= self.limit[len] {
                let idx = code - self.base[len];
                return match self.perm.get(idx as usize) {
                    Some(&symbol) if idx >= 0 => Ok(symbol),
                    _ => Err(DecodeError::InvalidHuffmanTable(format!(
                        "code {:b} of length {} maps outside the alphabet",
                        code, len
                    ))),
                };
            }
            len += 1;
            if len > self.max_len as usize {
                trace!("Unmatched huffman code at {}.", br.loc());
                return Err(DecodeError::InvalidHuffmanTable(format!(
                    "no code matches {:b}",
                    code
                )));
            }
            code = (code << 1) | br.bit()? as i32;
        }
    }
}

/// Reject length tables that can't form a prefix code before building anything from them.
fn validate_lengths(lengths: &[u8]) -> Result<()> {
    if lengths.is_empty() || lengths.len() > MAX_ALPHA_SIZE {
        return Err(DecodeError::InvalidHuffmanTable(format!(
            "alphabet of {} symbols",
            lengths.len()
        )));
    }
    if let Some(&len) = lengths
        .iter()
        .find(|&&len| len == 0 || len as u32 > MAX_CODE_LEN)
    {
        return Err(DecodeError::InvalidHuffmanTable(format!(
            "code length {} outside 1..={}",
            len, MAX_CODE_LEN
        )));
    }
    // Kraft sum, scaled so a complete code adds up to exactly 1 << MAX_CODE_LEN.
    let kraft: u64 = lengths
        .iter()
        .map(|&len| 1_u64 << (MAX_CODE_LEN - len as u32))
        .sum();
    if kraft > 1 << MAX_CODE_LEN {
        return Err(DecodeError::InvalidHuffmanTable(
            "code lengths over-subscribe the code space".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn canonical_decode_test() {
        // Lengths 2,1,3,3 give codes: sym1=0, sym0=10, sym2=110, sym3=111
        let table = HuffmanTable::from_lengths(&[2, 1, 3, 3]).unwrap();
        assert_eq!(table.min_len, 1);
        assert_eq!(table.max_len, 3);
        assert_eq!(table.perm.len(), 4);

        // 0 10 110 111 0 10 -> pad
        let data = [0b0101_1011_u8, 0b1010_0000];
        let mut br = BitReader::new(data.as_slice());
        let decoded = (0..6)
            .map(|_| table.decode(&mut br).unwrap())
            .collect::<Vec<u16>>();
        assert_eq!(decoded, vec![1, 0, 2, 3, 1, 0]);
    }

    #[test]
    fn equal_lengths_test() {
        let table = HuffmanTable::from_lengths(&[2, 2, 2, 2]).unwrap();
        let data = [0b0001_1011_u8];
        let mut br = BitReader::new(data.as_slice());
        let decoded = (0..4)
            .map(|_| table.decode(&mut br).unwrap())
            .collect::<Vec<u16>>();
        assert_eq!(decoded, vec![0, 1, 2, 3]);
    }

    #[test]
    fn gap_in_lengths_test() {
        // No 2 bit codes: sym0=0, sym1=100, sym2=101, sym3=110, sym4=111
        let table = HuffmanTable::from_lengths(&[1, 3, 3, 3, 3]).unwrap();
        let data = [0b1110_1010_u8, 0b0000_0000];
        let mut br = BitReader::new(data.as_slice());
        assert_eq!(table.decode(&mut br).unwrap(), 4);
        assert_eq!(table.decode(&mut br).unwrap(), 0);
        assert_eq!(table.decode(&mut br).unwrap(), 2);
        assert_eq!(table.decode(&mut br).unwrap(), 0);
    }

    #[test]
    fn incomplete_code_test() {
        // Only "0" and "10" exist, so "11" is not a code.
        let table = HuffmanTable::from_lengths(&[1, 2]).unwrap();
        let data = [0b1100_0000_u8];
        let mut br = BitReader::new(data.as_slice());
        assert!(matches!(
            table.decode(&mut br),
            Err(DecodeError::InvalidHuffmanTable(_))
        ));
    }

    #[test]
    fn invalid_lengths_test() {
        assert!(HuffmanTable::from_lengths(&[]).is_err());
        assert!(HuffmanTable::from_lengths(&[0, 0, 0]).is_err());
        assert!(HuffmanTable::from_lengths(&[1, 21, 2]).is_err());
        assert!(HuffmanTable::from_lengths(&[1, 1, 1]).is_err());
        assert!(HuffmanTable::from_lengths(&[1; 259]).is_err());
    }

    #[test]
    fn max_length_code_test() {
        // 1, 2, ..., 19, 20, 20 is a complete code using the full 20 bits.
        let mut lengths = (1..=20_u8).collect::<Vec<u8>>();
        lengths.push(20);
        let table = HuffmanTable::from_lengths(&lengths).unwrap();
        assert_eq!(table.max_len, 20);

        // The all ones code of length 20 is the last symbol.
        let data = [0xff_u8, 0xff, 0xf0];
        let mut br = BitReader::new(data.as_slice());
        assert_eq!(table.decode(&mut br).unwrap(), 20);
    }
}
