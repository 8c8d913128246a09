//! # Quartz Hardware Access Layer
//!
//! Register-level collaborators for the boot CPU probe.
//!
//! ## Components
//!
//! - **CPUID**: processor identification leaves
//! - **MSR**: model-specific register reads and typed decoders
//! - **PCI**: configuration space reads (mechanism #1)
//! - **PIT/TSC**: the legacy interval timer (channel 2) and the
//!   time-stamp counter, used together for calibration
//!
//! The probe only talks to hardware through the traits in [`platform`].
//! On x86_64 targets [`X86Platform`] implements them with port I/O and
//! privileged instructions; the `mock` feature provides a scripted
//! platform for host-side tests.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

pub mod cpuid;
pub mod error;
pub mod msr;
pub mod pci;
pub mod pit;
pub mod platform;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

cfg_if::cfg_if! {
    if #[cfg(target_arch = "x86_64")] {
        pub mod arch;
        pub use arch::x86_64::X86Platform;
    }
}

pub use cpuid::{CpuidReg, CpuidResult};
pub use error::{HalError, HalResult};
pub use pci::PciAddress;
pub use platform::{CalibrationTimer, Cpuid, ModelSpecificRegisters, PciConfigSpace, Platform};
