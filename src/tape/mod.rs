//! Reading Jupiter Ace TAP images and writing them out as TZX.
//!
//! A TAP image is nothing more than a run of blocks, each preceded by its
//! length as a 16-bit little-endian value.  It carries no timing at all and
//! does not say which blocks are headers; the Ace always saves a header block
//! followed by a data block, so the roles are inferred purely by alternation
//! starting from a header.
//!
//! Conversion is a single pass: the TZX header is written, then each TAP
//! block is read into a buffer owned by the `TapReader` and immediately
//! emitted by the `TzxWriter`.

mod error;
mod image;
mod tap;
mod timing;

pub mod tzx;

use std::io::{self, Read, Write};

use tracing::{debug, info};

pub use self::error::TapeError;
pub use self::image::Image;
pub use self::tap::{TapBlock, TapReader, MAX_BLOCK_SIZE};
pub use self::timing::{
    Timings, ACE_CLOCK_HZ, ACE_TIMINGS, DATA_PILOT_PULSES, HEADER_PILOT_PULSES, TZX_CLOCK_HZ,
};
pub use self::tzx::TzxWriter;

/// Flag byte carried in front of header blocks.
const HEADER_FLAG: u8 = 0x00;

/// The role of a tape block.  Headers are preceded by a longer pilot tone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockRole {
    Header,
    Data,
}

impl BlockRole {
    /// The flag byte written in front of the payload.  Data blocks carry the
    /// complement of the header flag.
    pub fn flag_byte(self) -> u8 {
        match self {
            BlockRole::Header => HEADER_FLAG,
            BlockRole::Data => !HEADER_FLAG,
        }
    }

    pub fn from_flag_byte(flag: u8) -> BlockRole {
        if flag == HEADER_FLAG {
            BlockRole::Header
        } else {
            BlockRole::Data
        }
    }

    pub fn pilot_pulses(self) -> u16 {
        match self {
            BlockRole::Header => HEADER_PILOT_PULSES,
            BlockRole::Data => DATA_PILOT_PULSES,
        }
    }

    /// The role of the block that follows this one.
    pub fn next(self) -> BlockRole {
        match self {
            BlockRole::Header => BlockRole::Data,
            BlockRole::Data => BlockRole::Header,
        }
    }
}

/// How to treat a TAP image whose last block is shorter than its declared
/// length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strictness {
    /// Regard the truncated block as the end of the tape.
    Lenient,
    /// Fail with `TapeError::TruncatedBlock`.
    Strict,
}

impl Default for Strictness {
    fn default() -> Strictness {
        Strictness::Lenient
    }
}

/// What a conversion did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    pub blocks: usize,
    pub payload_bytes: usize,
    pub bytes_written: usize,
    /// The input ended part way through a block, which was discarded.
    pub truncated: bool,
}

/// Convert a TAP stream into a TZX stream.  The writer is flushed once the
/// last block is written.
pub fn convert<R: Read, W: Write>(
    reader: R,
    writer: W,
    strictness: Strictness,
) -> io::Result<ConversionSummary> {
    let mut tap = TapReader::new(reader, strictness)?;
    let mut tzx = TzxWriter::new(writer)?;
    let mut role = BlockRole::Header;
    let mut payload_bytes = 0;

    while let Some(block) = tap.next_block()? {
        debug!(?role, length = block.len(), "writing TZX block");
        tzx.write_block(role, block.data())?;
        payload_bytes += block.len();
        role = role.next();
    }
    tzx.flush()?;

    let summary = ConversionSummary {
        blocks: tzx.blocks_written(),
        payload_bytes,
        bytes_written: tzx.bytes_written(),
        truncated: tap.truncated(),
    };
    info!(
        blocks = summary.blocks,
        bytes = summary.bytes_written,
        "conversion complete"
    );
    Ok(summary)
}

/// Convert a TAP image held in memory, returning the TZX image.
pub fn convert_bytes(tap: &[u8], strictness: Strictness) -> io::Result<Vec<u8>> {
    let mut output = Vec::with_capacity(tzx::HEADER_SIZE + tap.len() * 2);
    convert(tap, &mut output, strictness)?;
    Ok(output)
}
