//! BitReader: A module for the Rust version of the standard BZIP2 decompressor.
//!
//! Reads the packed, most-significant-bit-first bitstream of a BZIP2 compressed file.
//!
//! NOTE: This module reads from any source that supports BufRead. Bytes are only consumed from
//! the source once they are needed, so when a stream ends on a byte boundary the source is left
//! positioned on the very next byte.
//!
use std::io::BufRead;

use crate::decompression::error::{DecodeError, Result};

/// Largest request bint() will serve in one call.
pub const MAX_BINT: usize = 24;

/// Reads a binary Bzip2 stream.
#[derive(Debug)]
pub struct BitReader<R> {
    source: R,
    /// Bits already pulled from the source but not yet handed out (low `bit_count` bits).
    bits: u64,
    bit_count: usize,
    /// Bytes consumed from the source so far.
    cursor: u64,
}

impl<R: BufRead> BitReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            bits: 0,
            bit_count: 0,
            cursor: 0,
        }
    }

    /// Pull one more byte from the source into the bit buffer.
    fn refill(&mut self) -> Result<()> {
        let byte = {
            let buf = self.source.fill_buf()?;
            match buf.first() {
                Some(&byte) => byte,
                None => return Err(DecodeError::TruncatedInput),
            }
        };
        self.source.consume(1);
        self.cursor += 1;
        self.bits = (self.bits << 8) | byte as u64;
        self.bit_count += 8;
        Ok(())
    }

    /// Return the next bit (1 or 0).
    pub fn bit(&mut self) -> Result<u32> {
        if self.bit_count == 0 {
            self.refill()?;
        }
        self.bit_count -= 1;
        Ok(((self.bits >> self.bit_count) & 1) as u32)
    }

    /// Return *true* if the next bit is 1, *false* if 0, consuming the bit.
    pub fn bool_bit(&mut self) -> Result<bool> {
        self.bit().map(|bit| bit == 1)
    }

    /// Return the next n bits (n <= 24) as an unsigned value.
    pub fn bint(&mut self, n: usize) -> Result<u32> {
        debug_assert!(n <= MAX_BINT);
        while self.bit_count < n {
            self.refill()?;
        }
        self.bit_count -= n;
        let result = (self.bits >> self.bit_count) & ((1_u64 << n) - 1);
        // Forget the bits we just handed out so the buffer never grows past 32 bits.
        self.bits &= (1_u64 << self.bit_count) - 1;
        Ok(result as u32)
    }

    /// Return a 32 bit field (CRCs). Built from four 8 bit reads since bint() stops at 24.
    pub fn bint32(&mut self) -> Result<u32> {
        let mut result = 0_u32;
        for _ in 0..4 {
            result = result << 8 | self.bint(8)?;
        }
        Ok(result)
    }

    /// Returns a byte. This is a convenience function, and calls bint(8).
    pub fn byte(&mut self) -> Result<u8> {
        self.bint(8).map(|byte| byte as u8)
    }

    /// Returns a Vec<u8> of n bytes. This is a convenience function, and calls byte n times.
    pub fn bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        (0..n).map(|_| self.byte()).collect()
    }

    /// Drop any bits left over in a partially read byte.
    pub fn align_to_byte(&mut self) {
        self.bit_count -= self.bit_count % 8;
        self.bits &= (1_u64 << self.bit_count) - 1;
    }

    /// True when nothing is buffered and the source has no more bytes.
    pub fn is_exhausted(&mut self) -> Result<bool> {
        if self.bit_count > 0 {
            return Ok(false);
        }
        Ok(self.source.fill_buf()?.is_empty())
    }

    /// Give back the underlying source. Whole bytes still buffered are lost, so only call this
    /// on a byte boundary.
    pub fn into_inner(self) -> R {
        self.source
    }

    /// Debugging function. Report current position as [byte.bit].
    pub fn loc(&self) -> String {
        let bit = (8 - self.bit_count % 8) % 8;
        let byte = self.cursor - (self.bit_count as u64 + 7) / 8;
        format!("[{}.{}]", byte, bit)
    }
}
