//! The decompression module manages the Rust version of the standard BZIP2 decompressor.
//!
//! BZIP2 compression happens in the following steps:
//! - Run Length Encoding 1: Compress all runs of 4-255 identical bytes.
//! - Burrow Wheeler Transform: Sort the data to increase the probability of runs of identical bytes.
//! - Move To Front transform: Increase the frequency of lower byte values, and thereby decrease the frequency of other byte values.
//! - Run Length Encoding 2: Compress all runs of the zero byte.
//! - Huffman coding: Encode frequent byte values using smaller bit codes and less frequent byte values with longer bit codes.
//!
//! Decompression is single threaded. It follows the inverse of the compression process.
//! - Huffman decoding, RLE 2 and the MTF transform happen together when a block header is reached.
//! - BWT reversal links the block so it can be walked in order.
//! - RLE 1 expansion (and legacy derandomization) happen one output byte at a time as the caller asks for data.
//!
//! The block CRC is checked once the last byte of a block has been handed out, and the stream CRC at the
//! end of each stream.
//!
pub mod block_header;
pub mod block_output;
pub mod bwt_decode;
pub mod decompress;
pub mod error;
pub mod unzip;
