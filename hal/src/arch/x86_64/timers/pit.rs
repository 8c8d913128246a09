//! # PIT Channel 2
//!
//! One-shot countdowns on channel 2, polled through port B.
//! Channel 2's gate is software controlled (port 0x61 bit 0) and its
//! output level is readable (bit 5), which makes it usable as a
//! reference clock without interrupts.

use super::super::io::{inb, outb};
use crate::pit::{port_b, ports, CHANNEL2_ONE_SHOT};

/// Enable the channel 2 gate with the speaker disconnected
///
/// # Safety
///
/// Modifies system I/O ports.
pub unsafe fn enable_channel2_gate() {
    unsafe {
        let value = inb(ports::PORT_B);
        outb(ports::PORT_B, (value & !(port_b::GATE | port_b::SPEAKER)) | port_b::GATE);
    }
}

/// Disable the channel 2 gate and speaker output
///
/// # Safety
///
/// Modifies system I/O ports.
pub unsafe fn disable_channel2_gate() {
    unsafe {
        let value = inb(ports::PORT_B);
        outb(ports::PORT_B, value & !(port_b::GATE | port_b::SPEAKER));
    }
}

/// Load channel 2 with a mode 0 countdown of `count` ticks
///
/// # Safety
///
/// Must be called with interrupts disabled.
pub unsafe fn set_channel2_mode0(count: u16) {
    unsafe {
        outb(ports::COMMAND, CHANNEL2_ONE_SHOT);
        outb(ports::CHANNEL2, count as u8);
        outb(ports::CHANNEL2, (count >> 8) as u8);
    }
}

/// Spin until channel 2's output goes high; returns the number of reads
///
/// # Safety
///
/// Channel 2 must have been armed, otherwise this never returns.
pub unsafe fn poll_channel2_gate() -> u64 {
    let mut count = 0u64;
    loop {
        let value = unsafe { inb(ports::PORT_B) };
        count += 1;
        if value & port_b::OUTPUT != 0 {
            return count;
        }
        core::hint::spin_loop();
    }
}
