//! The tools module provides several helper functions for the Rust version of the standard BZIP2 decompressor.
//!
//! BZIP2 is a block-oriented approach to compress data.
//!
//! The tools are:
//! - cli: Command line interface for BZIP2.
//! - crc: CRC32 checksum for BZIP2, both block and stream versions.
//! - rand_table: Legacy block randomization for BZIP2.
//! - rle2_mtf_decode: Huffman symbols to pre-BWT bytes, undoing Run-Length-Encoding phase 2 and Move-To-Front (integrated for speed).
//! - symbol_map: Decode the symbol map used in BZIP2.
//!
pub mod cli;
pub mod crc;
pub mod rand_table;
pub mod rle2_mtf_decode;
pub mod symbol_map;
