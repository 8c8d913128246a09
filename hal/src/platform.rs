//! # Platform Traits
//!
//! The register primitives the probe consumes. Each trait maps to one
//! hardware mechanism so a test platform can script them independently.

use crate::cpuid::CpuidResult;
use crate::error::HalResult;
use crate::pci::PciAddress;

/// Processor identification
pub trait Cpuid {
    /// Execute CPUID for `leaf`/`subleaf`
    fn cpuid(&mut self, leaf: u32, subleaf: u32) -> CpuidResult;
}

/// Model-specific register reads
pub trait ModelSpecificRegisters {
    /// Read the 64-bit value of MSR `index`
    fn read_msr(&mut self, index: u32) -> HalResult<u64>;
}

/// PCI configuration space reads
pub trait PciConfigSpace {
    /// Read a 32-bit register
    fn read_config32(&mut self, addr: PciAddress, offset: u16) -> HalResult<u32>;

    /// Read a 16-bit register
    ///
    /// The default selects the half of the containing dword.
    fn read_config16(&mut self, addr: PciAddress, offset: u16) -> HalResult<u16> {
        let dword = self.read_config32(addr, offset & !0x3)?;
        Ok((dword >> ((offset & 0x2) * 8)) as u16)
    }
}

/// Reference timer used to calibrate the time-stamp counter
///
/// The timer is a shared channel: implementations assume nobody else
/// programs it between [`arm`](Self::arm) and [`disable`](Self::disable).
pub trait CalibrationTimer {
    /// Open the gate and load a one-shot countdown of `latch` ticks
    fn arm(&mut self, latch: u16);

    /// Spin until the countdown expires; returns the number of polls
    fn poll_gate(&mut self) -> u64;

    /// Close the gate
    fn disable(&mut self);

    /// Read the time-stamp counter
    fn read_tsc(&mut self) -> u64;
}

/// Everything the probe needs from the hardware
pub trait Platform: Cpuid + ModelSpecificRegisters + PciConfigSpace + CalibrationTimer {}

impl<T> Platform for T where T: Cpuid + ModelSpecificRegisters + PciConfigSpace + CalibrationTimer {}
