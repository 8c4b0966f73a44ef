//! Per-byte output of one decoded block.
//!
//! The BlockCursor holds just enough state to resume the RLE1 expansion between calls: the
//! position in the BWT walk, the run detector, the pending run, the legacy randomizer and the
//! running CRC. Each call to next_byte() does a bounded amount of work and returns one byte.

use log::error;

use crate::decompression::bwt_decode::bwt_step;
use crate::decompression::error::{CrcKind, DecodeError, Result};
use crate::tools::crc::BlockCrc;
use crate::tools::rand_table::Randomizer;

/// Four equal bytes in a row are followed by a count byte.
const RUN_TRIGGER: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// The next byte comes from the BWT walk.
    Literal,
    /// Emitting the rest of an RLE1 run.
    Run { byte: u8, left: u8 },
}

#[derive(Debug, Clone)]
pub struct BlockCursor {
    phase: Phase,
    t_pos: u32,
    /// BWT walk steps still to take.
    remaining: usize,
    last_byte: u8,
    /// How many times last_byte has been seen in a row (0 right after a run).
    repeats: u8,
    randomizer: Option<Randomizer>,
    crc: BlockCrc,
    expected_crc: u32,
}

impl BlockCursor {
    /// Start a cursor at `t_pos` (from bwt_decode) over a block of `len` pre-RLE1 bytes.
    pub fn new(t_pos: u32, len: usize, randomized: bool, expected_crc: u32) -> Self {
        Self {
            phase: Phase::Literal,
            t_pos,
            remaining: len,
            last_byte: 0,
            repeats: 0,
            randomizer: randomized.then(Randomizer::new),
            crc: BlockCrc::new(),
            expected_crc,
        }
    }

    /// Take one step through the BWT links, undoing the legacy randomization if set.
    #[inline]
    fn walk(&mut self, tt: &[u32]) -> u8 {
        let (mut byte, next) = bwt_step(tt, self.t_pos);
        self.t_pos = next;
        self.remaining -= 1;
        if let Some(rand) = self.randomizer.as_mut() {
            byte ^= rand.mask();
        }
        byte
    }

    /// Produce the next output byte, or None once the block is used up.
    pub fn next_byte(&mut self, tt: &[u32]) -> Option<u8> {
        loop {
            match self.phase {
                Phase::Run { left: 0, .. } => self.phase = Phase::Literal,
                Phase::Run { byte, left } => {
                    self.phase = Phase::Run {
                        byte,
                        left: left - 1,
                    };
                    self.crc.update(byte);
                    return Some(byte);
                }
                Phase::Literal => {
                    if self.remaining == 0 {
                        return None;
                    }
                    let byte = self.walk(tt);

                    // After four equal bytes this one is a repeat count, not data.
                    if self.repeats == RUN_TRIGGER {
                        self.repeats = 0;
                        self.phase = Phase::Run {
                            byte: self.last_byte,
                            left: byte,
                        };
                        continue;
                    }

                    if self.repeats > 0 && byte == self.last_byte {
                        self.repeats += 1;
                    } else {
                        self.repeats = 1;
                        self.last_byte = byte;
                    }
                    self.crc.update(byte);
                    return Some(byte);
                }
            }
        }
    }

    /// Check the CRC of everything produced against the stored block CRC.
    pub fn finish(&self) -> Result<u32> {
        let found = self.crc.value();
        if found == self.expected_crc {
            Ok(found)
        } else {
            error!(
                "Block CRC failed!!! Found {:#010x} looking for {:#010x}.",
                found, self.expected_crc
            );
            Err(DecodeError::CrcMismatch {
                kind: CrcKind::Block,
                expected: self.expected_crc,
                found,
            })
        }
    }
}
