//! # Programmable Interval Timer (PIT)
//!
//! The 8253/8254 PIT is the reference clock for TSC calibration.
//! Only channel 2 is used: its gate and output are visible through
//! port 0x61, so expiry can be polled without interrupts.
//!
//! ## Frequency
//!
//! The PIT runs at 1.193182 MHz (14.31818 MHz / 12).
//! With a 16-bit counter, this gives a maximum period of ~55ms.

use static_assertions::const_assert;

// =============================================================================
// Constants
// =============================================================================

/// PIT input clock (1.193182 MHz)
pub const PIT_FREQUENCY: u64 = 1_193_182;

/// Length of one calibration window in milliseconds
pub const CALIBRATE_TIME_MSEC: u64 = 30;

/// Channel 2 count for one calibration window, rounded to nearest
pub const CALIBRATE_LATCH: u16 = latch_for_ms(CALIBRATE_TIME_MSEC);

const_assert!((PIT_FREQUENCY * CALIBRATE_TIME_MSEC + 500) / 1000 <= u16::MAX as u64);

/// PIT I/O ports
pub mod ports {
    /// Channel 2 data port
    pub const CHANNEL2: u16 = 0x42;
    /// Command/mode register
    pub const COMMAND: u16 = 0x43;
    /// Port B (speaker control, channel 2 gate and output)
    pub const PORT_B: u16 = 0x61;
}

/// Port B bits
pub mod port_b {
    /// Channel 2 gate enable
    pub const GATE: u8 = 0x01;
    /// Speaker data enable
    pub const SPEAKER: u8 = 0x02;
    /// Channel 2 output level
    pub const OUTPUT: u8 = 0x20;
}

/// Count that expires after `ms` milliseconds
pub const fn latch_for_ms(ms: u64) -> u16 {
    ((PIT_FREQUENCY * ms + 1000 / 2) / 1000) as u16
}

// =============================================================================
// Command Encoding
// =============================================================================

/// PIT channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PitChannel {
    /// Channel 0 - System timer (IRQ 0)
    Channel0 = 0b00,
    /// Channel 1 - DRAM refresh (not used)
    Channel1 = 0b01,
    /// Channel 2 - Speaker / calibration
    Channel2 = 0b10,
}

/// PIT operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PitMode {
    /// Mode 0: Interrupt on terminal count
    InterruptOnTerminalCount = 0b000,
    /// Mode 2: Rate generator
    RateGenerator = 0b010,
    /// Mode 3: Square wave generator
    SquareWave = 0b011,
}

/// Access mode for counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PitAccess {
    /// Latch count value command
    Latch = 0b00,
    /// Low byte then high byte
    LowHigh = 0b11,
}

/// Build a command byte (binary counting)
pub const fn command(channel: PitChannel, access: PitAccess, mode: PitMode) -> u8 {
    ((channel as u8) << 6) | ((access as u8) << 4) | ((mode as u8) << 1)
}

/// Command that arms channel 2 as a one-shot countdown
pub const CHANNEL2_ONE_SHOT: u8 = command(
    PitChannel::Channel2,
    PitAccess::LowHigh,
    PitMode::InterruptOnTerminalCount,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calibration_latch() {
        assert_eq!(CALIBRATE_LATCH, 35795);
        assert_eq!(latch_for_ms(1), 1193);
    }

    #[test]
    fn test_one_shot_command() {
        assert_eq!(CHANNEL2_ONE_SHOT, 0xB0);
        assert_eq!(
            command(PitChannel::Channel0, PitAccess::LowHigh, PitMode::SquareWave),
            0x36
        );
    }
}
