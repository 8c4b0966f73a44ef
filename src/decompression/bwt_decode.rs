//! Burrows-Wheeler-Transform reversal.
//!
//! After the MTF/RLE2 stage the low byte of each `tt` entry holds the last column of the sorted
//! rotation matrix. One pass over the block threads a "next" link through the upper 24 bits, so
//! that following the links from the origin pointer visits the original bytes in order. Building
//! the links is O(n) once per block and every output byte after that is a single lookup.

use crate::decompression::error::{DecodeError, Result};

/// Link `tt` in place and return the starting position for the walk.
pub fn bwt_decode(tt: &mut [u32], freq_in: &[u32; 256], key: usize) -> Result<u32> {
    if key >= tt.len() {
        return Err(DecodeError::InvalidOrigPtr {
            orig_ptr: key,
            len: tt.len(),
        });
    }

    // Convert frequency count to a cumulative sum of frequencies
    let mut freq = [0_u32; 256];
    for i in 0..255 {
        freq[i + 1] = freq[i] + freq_in[i];
    }

    // Each byte in the last column precedes the same ranked byte in the first column.
    for i in 0..tt.len() {
        let s = (tt[i] & 0xff) as usize;
        tt[freq[s] as usize] |= (i as u32) << 8;
        freq[s] += 1;
    }

    Ok(tt[key] >> 8)
}

/// Follow one link. Returns the next original byte and the position after it.
#[inline]
pub fn bwt_step(tt: &[u32], t_pos: u32) -> (u8, u32) {
    let entry = tt[t_pos as usize];
    (entry as u8, entry >> 8)
}

#[cfg(test)]
mod test {
    use super::*;

    fn invert(last_column: &[u8], key: usize) -> Result<Vec<u8>> {
        let mut tt = last_column.iter().map(|&b| b as u32).collect::<Vec<u32>>();
        let mut freqs = [0_u32; 256];
        last_column.iter().for_each(|&b| freqs[b as usize] += 1);

        let mut t_pos = bwt_decode(&mut tt, &freqs, key)?;
        let mut out = Vec::with_capacity(tt.len());
        for _ in 0..tt.len() {
            let (byte, next) = bwt_step(&tt, t_pos);
            out.push(byte);
            t_pos = next;
        }
        Ok(out)
    }

    #[test]
    fn hello_test() {
        assert_eq!(invert(b"hoell", 1).unwrap(), b"hello".to_vec());
    }

    #[test]
    fn banana_test() {
        // Sorted rotations of "banana": abanan, anaban, ananab, banana, nabana, nanaba
        assert_eq!(invert(b"nnbaaa", 3).unwrap(), b"banana".to_vec());
    }

    #[test]
    fn single_byte_test() {
        assert_eq!(invert(b"x", 0).unwrap(), b"x".to_vec());
    }

    #[test]
    fn repeated_byte_test() {
        assert_eq!(invert(&[7; 9], 4).unwrap(), vec![7; 9]);
    }

    #[test]
    fn bad_key_test() {
        assert!(matches!(
            invert(b"nnbaaa", 6),
            Err(DecodeError::InvalidOrigPtr {
                orig_ptr: 6,
                len: 6
            })
        ));
        assert!(invert(b"", 0).is_err());
    }
}
