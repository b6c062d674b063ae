//! Pulse timings for Jupiter Ace tape signals.
//!
//! TZX expresses every pulse length in T-states of a 3.5 MHz Z80, the clock
//! of the ZX Spectrum.  The Jupiter Ace runs its Z80 at 3.25 MHz, so the
//! lengths below are the Ace ROM's native lengths scaled by 350/325.  To
//! recover the length the Ace itself produces, multiply by 325/350 (see
//! `Timings::to_ace_clock()`).

/// Clock frequency that TZX pulse lengths are expressed in.
pub const TZX_CLOCK_HZ: u32 = 3_500_000;
/// Clock frequency of the Jupiter Ace's Z80.
pub const ACE_CLOCK_HZ: u32 = 3_250_000;

/// Number of pilot pulses preceding a header block.
pub const HEADER_PILOT_PULSES: u16 = 0x20;
/// Number of pilot pulses preceding a data block.
pub const DATA_PILOT_PULSES: u16 = 0x04;

/// Pulse lengths, in T-states, for every part of a tape block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timings {
    pub pilot: u16,
    pub sync1: u16,
    pub sync2: u16,
    pub zero: u16,
    pub one: u16,
    pub end_mark1: u16,
    pub end_mark2: u16,
}

/// The Jupiter Ace tape timings at the TZX reference clock.
// Measurements are discussed at
// http://jupiterace.proboards.com/index.cgi?board=programmingaceforth&action=display&thread=266
pub const ACE_TIMINGS: Timings = Timings {
    pilot: 2114,
    sync1: 602,
    sync2: 826,
    zero: 812,
    one: 1666,
    end_mark1: 972,
    end_mark2: 4509,
};

impl Timings {
    /// Rescale a pulse length from the TZX clock to the Ace clock, rounding
    /// to the nearest cycle.
    pub const fn to_ace_clock(tstates: u16) -> u16 {
        let scaled = tstates as u32 * (ACE_CLOCK_HZ / 10_000);
        let divisor = TZX_CLOCK_HZ / 10_000;
        ((scaled + divisor / 2) / divisor) as u16
    }

    /// The same table expressed in Jupiter Ace clock cycles.
    pub fn at_ace_clock(&self) -> Timings {
        Timings {
            pilot: Self::to_ace_clock(self.pilot),
            sync1: Self::to_ace_clock(self.sync1),
            sync2: Self::to_ace_clock(self.sync2),
            zero: Self::to_ace_clock(self.zero),
            one: Self::to_ace_clock(self.one),
            end_mark1: Self::to_ace_clock(self.end_mark1),
            end_mark2: Self::to_ace_clock(self.end_mark2),
        }
    }
}
