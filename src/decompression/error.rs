//! Errors raised while decoding a bzip2 stream.
//!
//! Every error is fatal. Once a [`DecodeError`] has been returned the decoder refuses further
//! reads and should be closed.

use std::fmt::{Display, Formatter};
use std::io;

use thiserror::Error;

/// Which checksum failed to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrcKind {
    Block,
    Stream,
}
impl Display for CrcKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    /// The source ran dry in the middle of a field.
    #[error("unexpected end of input")]
    TruncatedInput,
    /// A 48 bit marker was neither a block header nor the end of stream footer.
    #[error("bad block magic {0:#014x}")]
    BadBlockMagic(u64),
    /// The stream header was not `BZh1`..`BZh9`.
    #[error("not a supported bzip2 stream: {0}")]
    UnsupportedFormat(String),
    #[error("invalid huffman table: {0}")]
    InvalidHuffmanTable(String),
    /// Huffman group count outside 2..=6, or an empty symbol map.
    #[error("invalid group count: {0}")]
    InvalidGroupCount(String),
    #[error("invalid selectors: {0}")]
    InvalidSelectors(String),
    /// The block decoded to more data than its declared capacity.
    #[error("block overran its capacity of {0} bytes")]
    UnexpectedEndOfBlock(usize),
    #[error("origin pointer {orig_ptr} is outside a block of {len} bytes")]
    InvalidOrigPtr { orig_ptr: usize, len: usize },
    #[error("{kind} CRC mismatch: stored {expected:#010x}, computed {found:#010x}")]
    CrcMismatch {
        kind: CrcKind,
        expected: u32,
        found: u32,
    },
    #[error("read from a closed decoder")]
    ClosedStream,
    /// A previous call failed, so the decoder state can no longer be trusted.
    #[error("decoder is unusable after an earlier error")]
    Poisoned,
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, DecodeError>;

impl From<DecodeError> for io::Error {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Io(e) => e,
            DecodeError::TruncatedInput => io::Error::new(io::ErrorKind::UnexpectedEof, err),
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
