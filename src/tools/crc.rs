//! CRC32 checksums for BZIP2, both block and stream versions.
//!
//! BZIP2 uses the CRC-32 polynomial 0x04c11db7 fed most-significant-bit first (no bit
//! reflection), which is why the usual reflected CRC-32 crates don't fit.

const POLY: u32 = 0x04c1_1db7;

const fn crc_table() -> [u32; 256] {
    let mut table = [0_u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u32) << 24;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000_0000 != 0 {
                (crc << 1) ^ POLY
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

static CRC_TABLE: [u32; 256] = crc_table();

/// Running block CRC, updated one output byte at a time.
#[derive(Debug, Clone, Copy)]
pub struct BlockCrc(u32);

impl BlockCrc {
    pub fn new() -> Self {
        Self(0xffff_ffff)
    }

    #[inline]
    pub fn update(&mut self, byte: u8) {
        self.0 = (self.0 << 8) ^ CRC_TABLE[((self.0 >> 24) ^ byte as u32) as usize];
    }

    pub fn value(&self) -> u32 {
        !self.0
    }
}

impl Default for BlockCrc {
    fn default() -> Self {
        Self::new()
    }
}

/// Continue a block CRC over a slice. Pass 0 to start a new block.
pub fn do_crc(crc: u32, data: &[u8]) -> u32 {
    let mut block_crc = BlockCrc(!crc);
    data.iter().for_each(|&byte| block_crc.update(byte));
    block_crc.value()
}

/// Fold a block CRC into the stream CRC.
pub fn do_stream_crc(stream_crc: u32, block_crc: u32) -> u32 {
    stream_crc.rotate_left(1) ^ block_crc
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn known_block_crcs_test() {
        assert_eq!(do_crc(0, b"hello"), 0x1931_653d);
        assert_eq!(do_crc(0, b"a"), 0x1993_9b6b);
        assert_eq!(do_crc(0, &[b'A'; 1000]), 0x4126_ba95);
        assert_eq!(do_crc(0, b""), 0);
    }

    #[test]
    fn incremental_crc_test() {
        let split = do_crc(do_crc(0, b"hel"), b"lo");
        assert_eq!(split, do_crc(0, b"hello"));

        let mut crc = BlockCrc::new();
        b"hello".iter().for_each(|&b| crc.update(b));
        assert_eq!(crc.value(), 0x1931_653d);
    }

    #[test]
    fn stream_crc_test() {
        assert_eq!(do_stream_crc(0, 0x1931_653d), 0x1931_653d);
        assert_eq!(do_stream_crc(0x8000_0001, 0), 0x0000_0003);
    }
}
