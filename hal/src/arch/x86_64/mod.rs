//! # x86_64 Platform
//!
//! Instruction-level implementation of the platform traits:
//!
//! - [`core`]: CPUID and RDMSR
//! - [`timers`]: PIT channel 2 and the TSC
//! - [`pci`]: configuration mechanism #1
//! - [`io`]: port I/O
//!
//! [`X86Platform`] owns PIT channel 2 for as long as it lives.

pub mod core;
pub mod io;
pub mod pci;
pub mod timers;

use spin::{Mutex, MutexGuard};

use crate::cpuid::CpuidResult;
use crate::error::{HalError, HalResult};
use crate::pci::PciAddress;
use crate::platform::{CalibrationTimer, Cpuid, ModelSpecificRegisters, PciConfigSpace};

/// Ownership token for PIT channel 2
static CHANNEL2: Mutex<()> = Mutex::new(());

/// The boot processor's registers, ports and timers
#[derive(Debug)]
pub struct X86Platform {
    _channel2: MutexGuard<'static, ()>,
}

impl X86Platform {
    /// Claim the platform
    ///
    /// Fails with [`HalError::TimerBusy`] while another `X86Platform`
    /// is alive.
    ///
    /// # Safety
    ///
    /// Must run in ring 0 with interrupts disabled, on a processor that
    /// implements every MSR the caller will read.
    pub unsafe fn claim() -> HalResult<Self> {
        let guard = CHANNEL2.try_lock().ok_or(HalError::TimerBusy)?;
        log::debug!("HAL: PIT channel 2 claimed");
        Ok(Self { _channel2: guard })
    }
}

impl Drop for X86Platform {
    fn drop(&mut self) {
        unsafe { timers::pit::disable_channel2_gate() };
    }
}

impl Cpuid for X86Platform {
    fn cpuid(&mut self, leaf: u32, subleaf: u32) -> CpuidResult {
        self::core::cpuid::cpuid(leaf, subleaf)
    }
}

impl ModelSpecificRegisters for X86Platform {
    fn read_msr(&mut self, index: u32) -> HalResult<u64> {
        Ok(unsafe { self::core::msr::rdmsr(index) })
    }
}

impl PciConfigSpace for X86Platform {
    fn read_config32(&mut self, addr: PciAddress, offset: u16) -> HalResult<u32> {
        Ok(unsafe { pci::read_config32(addr, offset) })
    }
}

impl CalibrationTimer for X86Platform {
    fn arm(&mut self, latch: u16) {
        unsafe {
            timers::pit::enable_channel2_gate();
            timers::pit::set_channel2_mode0(latch);
        }
    }

    fn poll_gate(&mut self) -> u64 {
        unsafe { timers::pit::poll_channel2_gate() }
    }

    fn disable(&mut self) {
        unsafe { timers::pit::disable_channel2_gate() }
    }

    fn read_tsc(&mut self) -> u64 {
        timers::tsc::read()
    }
}
