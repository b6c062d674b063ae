//! The subset of the TZX format needed to carry Jupiter Ace tape blocks.
//!
//! Every TAP block becomes a turbo speed data record (ID 0x11) holding the
//! Ace's pilot, sync and bit timings, followed by a pure tone record
//! (ID 0x13) reproducing the two end-mark pulses the Ace writes after each
//! block.

use std::fmt;
use std::io::{self, Write};

use crate::tape::error::TapeError;
use crate::tape::tap::MAX_BLOCK_SIZE;
use crate::tape::timing::{Timings, ACE_TIMINGS};
use crate::tape::BlockRole;
use crate::util;

pub const SIGNATURE: &[u8; 8] = b"ZXTape!\x1a";
pub const MAJOR_VERSION: u8 = 1;
pub const MINOR_VERSION: u8 = 13;
pub const HEADER_SIZE: usize = 10;

pub const TURBO_DATA_ID: u8 = 0x11;
pub const TURBO_DATA_SIZE: usize = 19;
pub const PURE_TONE_ID: u8 = 0x13;
/// The end mark is a pure tone of exactly two pulses.
pub const END_MARK_PULSES: usize = 2;
pub const END_MARK_SIZE: usize = 2 + 2 * END_MARK_PULSES;

/// The fixed header at the start of every TZX file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TzxHeader {
    pub major_version: u8,
    pub minor_version: u8,
}

impl TzxHeader {
    pub fn new() -> TzxHeader {
        TzxHeader {
            major_version: MAJOR_VERSION,
            minor_version: MINOR_VERSION,
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> io::Result<TzxHeader> {
        if bytes.len() < HEADER_SIZE {
            return Err(TapeError::TruncatedRecord.into());
        }
        if &bytes[..SIGNATURE.len()] != SIGNATURE {
            return Err(TapeError::InvalidSignature.into());
        }
        Ok(TzxHeader {
            major_version: bytes[8],
            minor_version: bytes[9],
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[..SIGNATURE.len()].copy_from_slice(SIGNATURE);
        bytes[8] = self.major_version;
        bytes[9] = self.minor_version;
        bytes
    }
}

impl Default for TzxHeader {
    fn default() -> TzxHeader {
        TzxHeader::new()
    }
}

/// Parameters of a turbo speed data record.  The record is followed on tape
/// by `data_length` bytes of data: the flag byte and then the TAP payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurboData {
    pub pilot: u16,
    pub sync1: u16,
    pub sync2: u16,
    pub zero: u16,
    pub one: u16,
    pub pilot_pulses: u16,
    /// Bits used in the final data byte.
    pub used_bits: u8,
    pub pause_ms: u16,
    /// 24-bit length of the data that follows.
    pub data_length: u32,
}

impl TurboData {
    /// Describe a TAP payload of `payload_length` bytes in the given role.
    pub fn for_block(timings: &Timings, role: BlockRole, payload_length: usize) -> TurboData {
        TurboData {
            pilot: timings.pilot,
            sync1: timings.sync1,
            sync2: timings.sync2,
            zero: timings.zero,
            one: timings.one,
            pilot_pulses: role.pilot_pulses(),
            used_bits: 8,
            pause_ms: 0,
            // One extra byte for the flag byte in front of the payload.
            data_length: payload_length as u32 + 1,
        }
    }

    /// The TAP payload length this record carries.
    pub fn payload_length(&self) -> usize {
        (self.data_length as usize).saturating_sub(1)
    }

    pub fn from_bytes(bytes: &[u8]) -> io::Result<TurboData> {
        if bytes.len() < TURBO_DATA_SIZE {
            return Err(TapeError::TruncatedRecord.into());
        }
        if bytes[0] != TURBO_DATA_ID {
            return Err(TapeError::UnsupportedRecord(bytes[0]).into());
        }
        let word = |offset: usize| u16::from_le_bytes([bytes[offset], bytes[offset + 1]]);
        Ok(TurboData {
            pilot: word(1),
            sync1: word(3),
            sync2: word(5),
            zero: word(7),
            one: word(9),
            pilot_pulses: word(11),
            used_bits: bytes[13],
            pause_ms: word(14),
            data_length: u32::from_le_bytes([bytes[16], bytes[17], bytes[18], 0]),
        })
    }

    pub fn to_bytes(&self) -> [u8; TURBO_DATA_SIZE] {
        let mut bytes = [0u8; TURBO_DATA_SIZE];
        bytes[0] = TURBO_DATA_ID;
        let words = [
            self.pilot,
            self.sync1,
            self.sync2,
            self.zero,
            self.one,
            self.pilot_pulses,
        ];
        for (i, word) in words.iter().enumerate() {
            bytes[1 + 2 * i..3 + 2 * i].copy_from_slice(&word.to_le_bytes());
        }
        bytes[13] = self.used_bits;
        bytes[14..16].copy_from_slice(&self.pause_ms.to_le_bytes());
        bytes[16..19].copy_from_slice(&self.data_length.to_le_bytes()[..3]);
        bytes
    }
}

impl fmt::Display for TurboData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "turbo data: pilot {}x{} sync {}/{} bits {}/{} length {}",
            self.pilot_pulses,
            self.pilot,
            self.sync1,
            self.sync2,
            self.zero,
            self.one,
            self.data_length
        )
    }
}

/// A pure tone record: `pulses.len()` pulses of the given lengths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PureTone {
    pub pulses: [u16; END_MARK_PULSES],
}

impl PureTone {
    /// The two pulses the Ace writes after every block.
    pub fn end_mark(timings: &Timings) -> PureTone {
        PureTone {
            pulses: [timings.end_mark1, timings.end_mark2],
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> io::Result<PureTone> {
        if bytes.len() < 2 {
            return Err(TapeError::TruncatedRecord.into());
        }
        if bytes[0] != PURE_TONE_ID {
            return Err(TapeError::UnsupportedRecord(bytes[0]).into());
        }
        // Only the two-pulse end mark is ever written.
        if bytes[1] as usize != END_MARK_PULSES {
            return Err(TapeError::UnsupportedRecord(PURE_TONE_ID).into());
        }
        if bytes.len() < END_MARK_SIZE {
            return Err(TapeError::TruncatedRecord.into());
        }
        Ok(PureTone {
            pulses: [
                u16::from_le_bytes([bytes[2], bytes[3]]),
                u16::from_le_bytes([bytes[4], bytes[5]]),
            ],
        })
    }

    pub fn to_bytes(&self) -> [u8; END_MARK_SIZE] {
        let mut bytes = [0u8; END_MARK_SIZE];
        bytes[0] = PURE_TONE_ID;
        bytes[1] = END_MARK_PULSES as u8;
        bytes[2..4].copy_from_slice(&self.pulses[0].to_le_bytes());
        bytes[4..6].copy_from_slice(&self.pulses[1].to_le_bytes());
        bytes
    }
}

impl fmt::Display for PureTone {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "pure tone: pulses {}/{}", self.pulses[0], self.pulses[1])
    }
}

/// Write the TZX file header.  This must happen exactly once, before any
/// record.
pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
    writer.write_all(&TzxHeader::new().to_bytes())
}

/// Write one TAP payload as a turbo data record, its flag byte, the payload
/// and the end mark.
pub fn write_block(writer: &mut dyn Write, role: BlockRole, payload: &[u8]) -> io::Result<()> {
    if payload.len() > MAX_BLOCK_SIZE {
        return Err(TapeError::BlockTooLarge(payload.len()).into());
    }
    writer.write_all(&TurboData::for_block(&ACE_TIMINGS, role, payload.len()).to_bytes())?;
    writer.write_all(&[role.flag_byte()])?;
    writer.write_all(payload)?;
    writer.write_all(&PureTone::end_mark(&ACE_TIMINGS).to_bytes())
}

/// Size on tape of the records for a payload of `payload_length` bytes.
pub fn encoded_size(payload_length: usize) -> usize {
    TURBO_DATA_SIZE + 1 + payload_length + END_MARK_SIZE
}

/// A TzxWriter emits a TZX file: the header when created, then one set of
/// records per block.
pub struct TzxWriter<W: Write> {
    writer: W,
    blocks_written: usize,
    bytes_written: usize,
}

impl<W: Write> TzxWriter<W> {
    pub fn new(mut writer: W) -> io::Result<TzxWriter<W>> {
        write_header(&mut writer)?;
        Ok(TzxWriter {
            writer,
            blocks_written: 0,
            bytes_written: HEADER_SIZE,
        })
    }

    pub fn write_block(&mut self, role: BlockRole, payload: &[u8]) -> io::Result<()> {
        write_block(&mut self.writer, role, payload)?;
        self.blocks_written += 1;
        self.bytes_written += encoded_size(payload.len());
        Ok(())
    }

    pub fn blocks_written(&self) -> usize {
        self.blocks_written
    }

    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// A decoded record, borrowing its data from the TZX image.
#[derive(Debug, PartialEq, Eq)]
pub enum Record<'a> {
    /// A turbo data record and the data following it (flag byte first).
    TurboData(TurboData, &'a [u8]),
    PureTone(PureTone),
}

impl<'a> Record<'a> {
    /// For turbo data, the role implied by the flag byte and the payload
    /// after it.
    pub fn block(&self) -> Option<(BlockRole, &'a [u8])> {
        match *self {
            Record::TurboData(_, data) if !data.is_empty() => {
                Some((BlockRole::from_flag_byte(data[0]), &data[1..]))
            }
            _ => None,
        }
    }
}

impl<'a> fmt::Display for Record<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Record::TurboData(ref params, data) => {
                writeln!(f, "{}", params)?;
                util::hexdump(f, "    ", data)
            }
            Record::PureTone(ref tone) => write!(f, "{}", tone),
        }
    }
}

/// Iterate over the records of a TZX image produced by this crate.
pub struct TzxRecords<'a> {
    bytes: &'a [u8],
    failed: bool,
}

impl<'a> TzxRecords<'a> {
    /// Check the header and position the iterator at the first record.
    pub fn new(bytes: &'a [u8]) -> io::Result<(TzxHeader, TzxRecords<'a>)> {
        let header = TzxHeader::from_bytes(bytes)?;
        Ok((
            header,
            TzxRecords {
                bytes: &bytes[HEADER_SIZE..],
                failed: false,
            },
        ))
    }

    fn next_record(&mut self) -> io::Result<Record<'a>> {
        let bytes = self.bytes;
        match bytes[0] {
            TURBO_DATA_ID => {
                let params = TurboData::from_bytes(bytes)?;
                let end = TURBO_DATA_SIZE + params.data_length as usize;
                if bytes.len() < end {
                    return Err(TapeError::TruncatedRecord.into());
                }
                self.bytes = &bytes[end..];
                Ok(Record::TurboData(params, &bytes[TURBO_DATA_SIZE..end]))
            }
            PURE_TONE_ID => {
                let tone = PureTone::from_bytes(bytes)?;
                self.bytes = &bytes[END_MARK_SIZE..];
                Ok(Record::PureTone(tone))
            }
            id => Err(TapeError::UnsupportedRecord(id).into()),
        }
    }
}

impl<'a> Iterator for TzxRecords<'a> {
    type Item = io::Result<Record<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.bytes.is_empty() {
            return None;
        }
        let result = self.next_record();
        self.failed = result.is_err();
        Some(result)
    }
}
