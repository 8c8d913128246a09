//! # Quartz Boot CPU Probe
//!
//! Determines the timing and topology of the boot processor before any
//! scheduler or interrupt-driven timekeeping exists: TSC frequency, bus
//! (FSB) frequency, core frequency, QPI link speed, and core/thread
//! counts. The result is a flat [`PlatformCpuInfo`] record for the stages
//! that build machine description tables.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────────────────┐   ┌────────────┐
//! │ CPUID cache  │──▶│ PIT/TSC      │──▶│ ratio + topology decode  │──▶│ QPI probe  │
//! │ brand string │   │ calibration  │   │ (per generation table)   │   │ (PCI)      │
//! └──────────────┘   └──────────────┘   └──────────────────────────┘   └────────────┘
//!                                                   │
//!                                                   ▼
//!                                       defaults, device class, record
//! ```
//!
//! ## Generations
//!
//! | Processors                     | Ratio source        | Topology source        |
//! |--------------------------------|---------------------|------------------------|
//! | Nehalem, Westmere, Sandy Bridge| MSR_PLATFORM_INFO   | MSR_CORE_THREAD_COUNT  |
//! | Core, Core 2, NetBurst         | IA32_PERF_STATUS    | CPUID leaves 1 and 4   |
//! | Anything else                  | 100 MHz bus default | 1 core, 1 thread       |
//!
//! Hardware is reached only through the [`quartz_hal::Platform`] traits,
//! so the whole probe runs against `quartz_hal::mock` in tests.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

pub mod brand;
pub mod calibrate;
pub mod config;
pub mod device_class;
pub mod ident;
pub mod info;
pub mod link;
pub mod model;
pub mod ratio;
pub mod resolver;

pub use calibrate::calibrate_tsc;
pub use config::{CalibrationConfig, ProbeConfig, TraceFlags};
pub use device_class::CpuType;
pub use ident::CpuVendor;
pub use info::{PlatformCpuInfo, TurboRatios};
pub use link::probe_link_speed;
pub use model::DecodeStrategy;
pub use ratio::Ratio;
pub use resolver::{resolve, DEFAULT_FSB_FREQUENCY};

/// Probe the boot processor on real hardware
///
/// Claims PIT channel 2 for the duration of the probe and releases it,
/// gate disabled, before returning.
///
/// # Safety
///
/// Must run at ring 0 with no other user of PIT channel 2, port 0x61,
/// or the PCI configuration ports.
#[cfg(target_arch = "x86_64")]
pub unsafe fn probe(config: &ProbeConfig) -> quartz_hal::HalResult<PlatformCpuInfo> {
    // SAFETY: forwarded from the caller
    let mut platform = unsafe { quartz_hal::X86Platform::claim()? };
    resolve(&mut platform, config)
}
