//! This is a Rust library for converting tape images made for the Jupiter Ace
//! home computer from the bare TAP format into TZX, the format emulators use
//! to reproduce a tape's original loading signal.
//!
//! Features:
//!
//! * Read TAP images block by block, from any `io::Read` or from a
//! memory-mapped file.
//! * Write each block as a TZX turbo speed data record carrying the Ace's
//! pilot, sync and bit timings, followed by the Ace's two-pulse end mark.
//! * Tell header blocks from data blocks by alternation, giving headers the
//! longer pilot tone the Ace ROM produces.
//! * Decode the records this crate writes, for inspection and testing.
//! * A sample `acetap2tzx` program that converts a TAP file on the command
//! line.
//!
//! Current shortcomings:
//!
//! * TAP block checksums are carried through untouched and never checked.
//! * Only the two TZX record types needed for Ace tapes are understood.
//! * The timings are fixed at the values measured for a stock Ace.
//!
//! # Example
//!
//! Convert a one-block TAP image in memory and list the resulting records:
//!
//! ```
//! use acetap::tape::tzx::TzxRecords;
//! use acetap::{convert_bytes, Strictness};
//! # fn main() -> std::io::Result<()> {
//! let tap = [0x02, 0x00, 0xAA, 0xBB];
//! let tzx = convert_bytes(&tap, Strictness::Lenient)?;
//!
//! let (header, records) = TzxRecords::new(&tzx)?;
//! assert_eq!((header.major_version, header.minor_version), (1, 13));
//! for record in records {
//!     println!("{}", record?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! which prints:
//!
//! ```text
//! turbo data: pilot 32x2114 sync 602/826 bits 812/1666 length 3
//!     0000: 00 aa bb                                        ...
//! pure tone: pulses 972/4509
//! ```
//!
//! # Timing
//!
//! TZX measures pulses in T-states of a 3.5 MHz Z80.  The Jupiter Ace runs
//! at 3.25 MHz, so every pulse length stored here is the Ace's native length
//! scaled by 350/325.  The table lives in `tape::ACE_TIMINGS`.
//!
//! # Truncated images
//!
//! Plenty of TAP dumps in the wild end part way through a block.  By default
//! such a block is dropped and conversion ends as if the tape ended cleanly
//! (`Strictness::Lenient`).  `Strictness::Strict` reports it instead.
//!
//! # License
//!
//! Acetap is distributed under the terms of both the MIT license and the
//! Apache License (Version 2.0).
//!
//! See LICENSE-APACHE and LICENSE-MIT for details.

pub mod tape;

mod util;

pub use crate::tape::{convert, convert_bytes, BlockRole, ConversionSummary, Strictness};
