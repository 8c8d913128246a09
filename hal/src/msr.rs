//! # Model-Specific Register Layouts
//!
//! Addresses and field decoders for the ratio and topology MSRs.
//!
//! The decoders wrap a raw `u64` so they work on values obtained from
//! any [`ModelSpecificRegisters`](crate::ModelSpecificRegisters)
//! implementation, including the scripted mock.
//!
//! ## Registers
//!
//! - **IA32_PERF_STATUS**: current and maximum bus ratio (Core 2 era)
//! - **MSR_PLATFORM_INFO**: maximum non-turbo ratio (Nehalem and later)
//! - **MSR_FLEX_RATIO**: firmware-programmed ratio override
//! - **MSR_CORE_THREAD_COUNT**: enabled cores and threads in the package
//! - **MSR_TURBO_RATIO_LIMIT**: per-active-core turbo ratios

// =============================================================================
// MSR ADDRESSES
// =============================================================================

/// MSR address namespace
pub mod addr {
    /// Enabled core and thread count
    pub const MSR_CORE_THREAD_COUNT: u32 = 0x0000_0035;
    /// Platform information (maximum non-turbo ratio)
    pub const MSR_PLATFORM_INFO: u32 = 0x0000_00CE;
    /// Flexible ratio override
    pub const MSR_FLEX_RATIO: u32 = 0x0000_0194;
    /// Performance status (current/maximum bus ratio)
    pub const IA32_PERF_STATUS: u32 = 0x0000_0198;
    /// Maximum turbo ratio per active core count
    pub const MSR_TURBO_RATIO_LIMIT: u32 = 0x0000_01AD;
}

// =============================================================================
// PERFORMANCE STATUS
// =============================================================================

/// IA32_PERF_STATUS layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerfStatus {
    value: u64,
}

impl PerfStatus {
    /// MSR address
    pub const ADDRESS: u32 = addr::IA32_PERF_STATUS;

    /// Wrap a raw value
    pub const fn from_raw(value: u64) -> Self {
        Self { value }
    }

    /// Current bus ratio (bits 12:8)
    pub fn current_ratio(self) -> u8 {
        ((self.value >> 8) & 0x1F) as u8
    }

    /// Current ratio has an extra half step (bit 14)
    pub fn current_half_step(self) -> bool {
        (self.value >> 14) & 0x01 != 0
    }

    /// Maximum bus ratio (bits 44:40)
    pub fn max_ratio(self) -> u8 {
        ((self.value >> 40) & 0x1F) as u8
    }

    /// Maximum ratio has an extra half step (bit 46)
    pub fn max_half_step(self) -> bool {
        (self.value >> 46) & 0x01 != 0
    }
}

// =============================================================================
// PLATFORM INFO
// =============================================================================

/// MSR_PLATFORM_INFO layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformInfo {
    value: u64,
}

impl PlatformInfo {
    /// MSR address
    pub const ADDRESS: u32 = addr::MSR_PLATFORM_INFO;

    /// Wrap a raw value
    pub const fn from_raw(value: u64) -> Self {
        Self { value }
    }

    /// Maximum non-turbo ratio (bits 15:8)
    pub fn max_non_turbo_ratio(self) -> u8 {
        ((self.value >> 8) & 0xFF) as u8
    }

    /// Maximum efficiency ratio (bits 47:40)
    pub fn max_efficiency_ratio(self) -> u8 {
        ((self.value >> 40) & 0xFF) as u8
    }
}

// =============================================================================
// FLEX RATIO
// =============================================================================

/// MSR_FLEX_RATIO layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlexRatio {
    value: u64,
}

impl FlexRatio {
    /// MSR address
    pub const ADDRESS: u32 = addr::MSR_FLEX_RATIO;

    /// Wrap a raw value
    pub const fn from_raw(value: u64) -> Self {
        Self { value }
    }

    /// Override is in effect (bit 16)
    pub fn enabled(self) -> bool {
        (self.value >> 16) & 0x01 != 0
    }

    /// Programmed ratio (bits 15:8)
    pub fn ratio(self) -> u8 {
        ((self.value >> 8) & 0xFF) as u8
    }

    /// Clamp `nominal` to the programmed ratio when the override is
    /// enabled and lower
    pub fn clamp(self, nominal: u8) -> u8 {
        if self.enabled() && nominal > self.ratio() {
            self.ratio()
        } else {
            nominal
        }
    }
}

// =============================================================================
// CORE/THREAD COUNT
// =============================================================================

/// MSR_CORE_THREAD_COUNT layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreThreadCount {
    value: u64,
}

impl CoreThreadCount {
    /// MSR address
    pub const ADDRESS: u32 = addr::MSR_CORE_THREAD_COUNT;

    /// Wrap a raw value
    pub const fn from_raw(value: u64) -> Self {
        Self { value }
    }

    /// Core count from bits `hi_bit..=16`
    ///
    /// Westmere and Sandy Bridge A0 silicon return garbage above bit 19,
    /// callers pass 19 for those parts and 31 otherwise.
    pub fn cores(self, hi_bit: u32) -> u32 {
        let width = hi_bit.saturating_sub(16) + 1;
        ((self.value >> 16) & ((1u64 << width) - 1)) as u32
    }

    /// Thread count (bits 15:0)
    pub fn threads(self) -> u32 {
        (self.value & 0xFFFF) as u32
    }
}

// =============================================================================
// TURBO RATIO LIMIT
// =============================================================================

/// MSR_TURBO_RATIO_LIMIT layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurboRatioLimit {
    value: u64,
}

impl TurboRatioLimit {
    /// MSR address
    pub const ADDRESS: u32 = addr::MSR_TURBO_RATIO_LIMIT;

    /// Wrap a raw value
    pub const fn from_raw(value: u64) -> Self {
        Self { value }
    }

    /// Maximum ratio with `active` cores running (1-based, up to 8)
    pub fn ratio_for(self, active: u32) -> u8 {
        match active {
            1..=8 => (self.value >> ((active - 1) * 8)) as u8,
            _ => 0,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
