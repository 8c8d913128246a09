//! # Probe Configuration
//!
//! Compile-time defaults come from Cargo features; the composition root
//! may override them before calling [`crate::probe`].

use bitflags::bitflags;
use quartz_hal::pit::{CALIBRATE_LATCH, CALIBRATE_TIME_MSEC};

bitflags! {
    /// Optional diagnostic output
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TraceFlags: u8 {
        /// Dump the resolved record at debug level
        const DEBUG_DUMP = 1 << 0;
        /// Read MSR_TURBO_RATIO_LIMIT and list per-core turbo ratios
        const TURBO_RATIOS = 1 << 1;
    }
}

impl TraceFlags {
    /// Flags selected by the `debug_trace` and `turbo_ratio_trace` features
    pub const fn from_features() -> Self {
        let mut bits = 0;
        if cfg!(feature = "debug_trace") {
            bits |= Self::DEBUG_DUMP.bits();
        }
        if cfg!(feature = "turbo_ratio_trace") {
            bits |= Self::TURBO_RATIOS.bits();
        }
        Self::from_bits_truncate(bits)
    }
}

/// TSC calibration parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationConfig {
    /// Number of timed runs; the minimum valid delta wins
    pub attempts: u32,
    /// Length of one run in milliseconds
    pub window_ms: u64,
    /// PIT count that expires after `window_ms`
    pub latch: u16,
}

impl CalibrationConfig {
    /// Ten 30 ms runs
    pub const fn new() -> Self {
        Self {
            attempts: 10,
            window_ms: CALIBRATE_TIME_MSEC,
            latch: CALIBRATE_LATCH,
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Probe configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Diagnostic output
    pub trace: TraceFlags,
    /// TSC calibration
    pub calibration: CalibrationConfig,
}

impl ProbeConfig {
    /// Feature-selected tracing, default calibration
    pub const fn new() -> Self {
        Self {
            trace: TraceFlags::from_features(),
            calibration: CalibrationConfig::new(),
        }
    }

    /// Replace the trace flags
    pub const fn with_trace(mut self, trace: TraceFlags) -> Self {
        self.trace = trace;
        self
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self::new()
    }
}
