//! The in-use byte map from the block header.

use std::io::BufRead;

use log::trace;

use crate::bitstream::bitreader::BitReader;
use crate::decompression::error::Result;

const BIT_MASK: u16 = 0x8000;

/// Reads the two level symbol map from the block header and returns the sorted byte values
/// in use (seq_to_unseq: dense symbol index -> byte value).
pub fn read_sym_map<R: BufRead>(br: &mut BitReader<R>) -> Result<Vec<u8>> {
    let index = br.bint(16)? as u16;
    let symbol_loc = br.loc();

    // One 16 bit map follows for each range flagged in the index, in order.
    let mut maps = Vec::with_capacity(1 + index.count_ones() as usize);
    maps.push(index);
    for _ in 0..index.count_ones() {
        maps.push(br.bint(16)? as u16);
    }
    trace!("Read {} symbol maps at {}.", maps.len(), symbol_loc);

    Ok(decode_sym_map(&maps))
}

/// Expands an index word plus its range maps into the sorted list of bytes they mark.
///
/// Bit 15 of the index covers bytes 0x00-0x0f, bit 14 covers 0x10-0x1f and so on. Each set
/// index bit is matched by one entry after the index, again MSB first.
pub fn decode_sym_map(symbol_map: &[u16]) -> Vec<u8> {
    let (index, ranges) = match symbol_map.split_first() {
        Some(split) => split,
        None => return Vec::new(),
    };
    let present = (0..16_u8).filter(|range| index & (BIT_MASK >> range) != 0);

    present
        .zip(ranges)
        .flat_map(|(range, &map)| {
            (0..16_u8)
                .filter(move |bit| map & (BIT_MASK >> bit) != 0)
                .map(move |bit| range << 4 | bit)
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decode_symbol_map_test() {
        let maps = vec![11008, 32770, 4, 17754, 6208];
        let mut compare = "Making a silly test.".as_bytes().to_vec();
        compare.sort_unstable();
        compare.dedup();
        assert_eq!(compare, decode_sym_map(&maps));
    }

    #[test]
    fn decode_symbol_map_full_test() {
        let maps = vec![0xffff; 17];
        let compare = (0..=255).collect::<Vec<u8>>();
        assert_eq!(compare, decode_sym_map(&maps));
    }

    #[test]
    fn read_symbol_map_test() {
        // Index 0x0200 (bytes 0x60-0x6f), then 0x0489: e, h, l, o
        let data = [0x02, 0x00, 0x04, 0x89];
        let mut br = BitReader::new(data.as_slice());
        assert_eq!(read_sym_map(&mut br).unwrap(), b"ehlo".to_vec());
    }

    #[test]
    fn read_empty_symbol_map_test() {
        let data = [0x00, 0x00];
        let mut br = BitReader::new(data.as_slice());
        assert!(read_sym_map(&mut br).unwrap().is_empty());
    }

    #[test]
    fn truncated_symbol_map_test() {
        // Index promises two maps, only one arrives.
        let data = [0x81, 0x00, 0xff, 0xff];
        let mut br = BitReader::new(data.as_slice());
        assert!(read_sym_map(&mut br).is_err());
    }
}
