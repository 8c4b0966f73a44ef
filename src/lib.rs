//! Rust version of the standard BZIP2 decompressor.
//!
//! Version 0.1.0
//!
//! Turns a bzip2 compressed byte stream back into the original data, one byte at a time.
//! Nothing larger than the current block's working buffer is ever held in memory, and the
//! caller decides how fast the stream is drained.
//!
//! Basic usage to decompress a file is as follows:
//!
//! `$> bunzip test.txt.bz2`
//!
//! This will decompress the file and create the file test.txt.
//! The compressed file will be deleted unless `-k` is given.
//!
//! From a program, wrap any buffered source in a [`Decoder`]:
//!
//! ```no_run
//! use std::io::{BufReader, Read};
//!
//! let file = std::fs::File::open("test.txt.bz2").unwrap();
//! let mut decoder = bzdecode::Decoder::open(BufReader::new(file), true).unwrap();
//! let mut text = String::new();
//! decoder.read_to_string(&mut text).unwrap();
//! ```
//!
pub mod bitstream;
pub mod decompression;
pub mod huffman_coding;
pub mod tools;

pub use decompression::decompress::Decoder;
pub use decompression::error::{DecodeError, Result};
