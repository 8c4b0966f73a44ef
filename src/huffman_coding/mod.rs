//! The huffman module rebuilds the decode tables for the Rust version of the standard BZIP2 decompressor.
//!
//! BZIP2 is a block-oriented approach to compress data.
//!
//! Huffman encoding is used in lieu of arithmetic encoding because of an historical problem with licensing restrictions.
//! While that has been resolved in more recent years, the BZIP2 standard was set based on the huffman standard.
//!
//! The huffman coding algorithm as used by BZIP2 is both block and chunk oriented. Within each block, chunks of 50
//! symbols are encoded separately using one of two to six huffman tables. A selector list in the block header says
//! which table each chunk uses.
//!
//! The process of decoding each block is inherently sequential and does not benefit from multithreading.
//!
pub mod huffman;
