//! The bitstream module forms the input subsystem for the Rust version of the standard BZIP2 decompressor.
//!
//! BZIP2 is a block-oriented approach to compress data, but the blocks are packed back to back
//! with no byte alignment. Block headers, huffman tables and the huffman coded data all have to be
//! read a bit (or a handful of bits) at a time.
//!
//! This subsystem is designed to efficiently interface with the other modules within BZIP2. It is not
//! intended for more general use.
//!
pub mod bitreader;
