use std::io::{self, BufRead, Read};

use log::{debug, error, info, trace};

use crate::bitstream::bitreader::BitReader;
use crate::decompression::block_header::{read_marker, BlockHeader, Marker};
use crate::decompression::block_output::BlockCursor;
use crate::decompression::bwt_decode::bwt_decode;
use crate::decompression::error::{CrcKind, DecodeError, Result};
use crate::tools::crc::do_stream_crc;
use crate::tools::rle2_mtf_decode::rle2_mtf_decode;

const SIGNATURE: &[u8; 3] = b"BZh";

/// Where the decoder is between calls.
#[derive(Debug)]
enum State {
    /// The next thing in the stream is a block header or the stream footer.
    StartBlock,
    /// Producing the bytes of a decoded block.
    InBlock(BlockCursor),
    Eof,
    Closed,
    Poisoned,
}

/// Streaming bzip2 decoder. Pull bytes with read_byte(), read_into() or the Read impl.
///
/// Not reentrant: one decoder serves one caller at a time.
#[derive(Debug)]
pub struct Decoder<R> {
    reader: Option<BitReader<R>>,
    state: State,
    /// Keep decoding streams appended after the first one.
    concatenated: bool,
    /// Maximum block size of the current stream, in bytes.
    block_size: usize,
    /// Pre-BWT bytes and BWT links of the current block. Reused from block to block.
    tt: Vec<u32>,
    stream_crc: u32,
    /// Error held back by read_into() so the bytes before it can be returned first.
    pending: Option<DecodeError>,
    block_counter: usize,
    stream_counter: usize,
}

impl<R: BufRead> Decoder<R> {
    /// Check the stream header and get ready to decode. With `concatenated` set, streams
    /// appended back to back are decoded as one; otherwise decoding stops after the first
    /// stream and the source is left on the byte that follows it.
    pub fn open(source: R, concatenated: bool) -> Result<Self> {
        let mut br = BitReader::new(source);
        let block_size = read_stream_header(&mut br)?;
        Ok(Self {
            reader: Some(br),
            state: State::StartBlock,
            concatenated,
            block_size,
            tt: Vec::new(),
            stream_crc: 0,
            pending: None,
            block_counter: 0,
            stream_counter: 0,
        })
    }

    /// Returns the next decompressed byte, or None at the end of the data.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        self.check_usable()?;
        let result = self.next_byte();
        if result.is_err() {
            self.state = State::Poisoned;
        }
        result
    }

    /// Fill as much of `buf` as the data allows. Returns the number of bytes written, which is
    /// only 0 at the end of the data (or for an empty buf). An error hit after some bytes
    /// were written is reported by the next call.
    pub fn read_into(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.check_usable()?;
        let mut count = 0;
        while count < buf.len() {
            match self.read_byte() {
                Ok(Some(byte)) => {
                    buf[count] = byte;
                    count += 1;
                }
                Ok(None) => break,
                Err(e) if count > 0 => {
                    self.pending = Some(e);
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(count)
    }

    /// Release the working buffer and the source. Safe to call more than once.
    pub fn close(&mut self) {
        if !matches!(self.state, State::Closed) {
            debug!(
                "Closing decoder after {} blocks in {} streams.",
                self.block_counter, self.stream_counter
            );
        }
        self.reader = None;
        self.tt = Vec::new();
        self.pending = None;
        self.state = State::Closed;
    }

    /// Give back the source. After a single stream decode this is positioned on the byte
    /// following the stream. None if the decoder was closed.
    pub fn into_inner(self) -> Option<R> {
        self.reader.map(BitReader::into_inner)
    }

    /// Block size of the current stream in bytes (100k to 900k).
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn blocks_decoded(&self) -> usize {
        self.block_counter
    }

    pub fn streams_decoded(&self) -> usize {
        self.stream_counter
    }

    /// Hand back a held error, or fail if the decoder was closed or has already failed.
    fn check_usable(&mut self) -> Result<()> {
        if let Some(e) = self.pending.take() {
            return Err(e);
        }
        match self.state {
            State::Closed => Err(DecodeError::ClosedStream),
            State::Poisoned => Err(DecodeError::Poisoned),
            _ => Ok(()),
        }
    }

    /// Step the state machine until it yields a byte or reaches the end.
    fn next_byte(&mut self) -> Result<Option<u8>> {
        loop {
            match &mut self.state {
                State::InBlock(cursor) => {
                    if let Some(byte) = cursor.next_byte(&self.tt) {
                        return Ok(Some(byte));
                    }
                    let block_crc = cursor.finish()?;
                    self.stream_crc = do_stream_crc(self.stream_crc, block_crc);
                    info!("Block {} CRCs matched.", self.block_counter);
                    self.state = State::StartBlock;
                }
                State::StartBlock => self.start_block()?,
                State::Eof => return Ok(None),
                State::Closed => return Err(DecodeError::ClosedStream),
                State::Poisoned => return Err(DecodeError::Poisoned),
            }
        }
    }

    /// Decode the next block up to the point where bytes can be walked out of it, or handle
    /// the end of stream footer.
    fn start_block(&mut self) -> Result<()> {
        let br = self.reader.as_mut().ok_or(DecodeError::ClosedStream)?;

        match read_marker(br)? {
            Marker::Block => {
                self.block_counter += 1;
                info!("Found a valid header for block {}.", self.block_counter);

                let header = BlockHeader::parse(br, self.block_size)?;
                let freqs = rle2_mtf_decode(br, &header, &mut self.tt, self.block_size)?;
                let t_pos = bwt_decode(&mut self.tt, &freqs, header.orig_ptr)?;
                debug!(
                    "Block {} holds {} bytes before RLE1 expansion.",
                    self.block_counter,
                    self.tt.len()
                );

                self.state = State::InBlock(BlockCursor::new(
                    t_pos,
                    self.tt.len(),
                    header.randomized,
                    header.block_crc,
                ));
            }
            Marker::EndOfStream => {
                let final_crc = br.bint32()?;
                if final_crc != self.stream_crc {
                    error!(
                        "Stream CRC failed!!! Found {:#010x} looking for {:#010x}.",
                        self.stream_crc, final_crc
                    );
                    return Err(DecodeError::CrcMismatch {
                        kind: CrcKind::Stream,
                        expected: final_crc,
                        found: self.stream_crc,
                    });
                }
                self.stream_counter += 1;
                info!("Stream CRCs matched: {:#010x}.", final_crc);

                // Streams are padded to a whole byte.
                br.align_to_byte();
                trace!("Stream {} ends at {}.", self.stream_counter, br.loc());

                if self.concatenated && !br.is_exhausted()? {
                    self.block_size = read_stream_header(br)?;
                    self.stream_crc = 0;
                    self.state = State::StartBlock;
                } else {
                    self.tt = Vec::new();
                    self.state = State::Eof;
                }
            }
        }
        Ok(())
    }
}

/// Check for "BZh" and a block size digit. Returns the block size in bytes.
fn read_stream_header<R: BufRead>(br: &mut BitReader<R>) -> Result<usize> {
    let signature = br.bytes(3)?;
    if signature != SIGNATURE {
        return Err(DecodeError::UnsupportedFormat(format!(
            "bad signature {:02x?}",
            signature
        )));
    }
    let level = br.byte()?;
    if !(b'1'..=b'9').contains(&level) {
        return Err(DecodeError::UnsupportedFormat(format!(
            "block size byte {:#04x}",
            level
        )));
    }
    let block_size = (level - b'0') as usize * 100_000;
    info!("Found a valid bzip2 signature, block size {}.", block_size);
    Ok(block_size)
}

impl<R: BufRead> Read for Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_into(buf)?)
    }
}
