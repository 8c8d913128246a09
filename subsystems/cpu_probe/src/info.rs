//! # Platform CPU Record
//!
//! The flat record handed to the table generators. It is built once by
//! [`crate::resolve`] and never modified afterwards.

use core::fmt;

use heapless::Vec;
use quartz_hal::msr::TurboRatioLimit;

use crate::brand::BrandString;
use crate::device_class::CpuType;
use crate::ident::{CpuVendor, CpuidCache, Signature};
use crate::ratio::Ratio;

/// Most active-core counts MSR_TURBO_RATIO_LIMIT is read for
pub const MAX_TURBO_ENTRIES: usize = 6;

/// Maximum turbo ratio per number of active cores
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurboRatios {
    ratios: Vec<u8, MAX_TURBO_ENTRIES>,
}

impl TurboRatios {
    /// Entries for one and two active cores, plus three and four on
    /// quad-core parts and five and six on six-core parts
    pub fn decode(limit: TurboRatioLimit, cores: u32) -> Self {
        let entries = match cores {
            0..=3 => 2,
            4 | 5 => 4,
            _ => MAX_TURBO_ENTRIES,
        };

        let mut ratios = Vec::new();
        for active in 1..=entries {
            // Capacity is MAX_TURBO_ENTRIES and entries never exceeds it
            let _ = ratios.push(limit.ratio_for(active as u32));
        }
        Self { ratios }
    }

    /// Ratio with `active` cores running (1-based)
    pub fn ratio(&self, active: usize) -> Option<u8> {
        active.checked_sub(1).and_then(|i| self.ratios.get(i)).copied()
    }

    /// Recorded ratios, one active core first
    pub fn as_slice(&self) -> &[u8] {
        &self.ratios
    }
}

impl fmt::Display for TurboRatios {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, ratio) in self.ratios.iter().enumerate() {
            let plural = if i == 0 { " " } else { "s" };
            writeln!(f, "CPU: Max Turbo with {} core{}: {}MHz", i + 1, plural, u32::from(*ratio) * 100)?;
        }
        Ok(())
    }
}

/// Resolved processor description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformCpuInfo {
    /// Vendor, family, model and stepping
    pub id: Signature,
    /// Brand string, empty when absent or indeterminate
    pub brand: BrandString,
    /// Mobile part
    pub mobile: bool,
    /// Standard and extended feature bits, OR-ed together
    pub features: u32,
    /// Identification leaves read during the probe
    pub cpuid: CpuidCache,

    /// Enabled cores in the package, at least 1
    pub cores: u32,
    /// Enabled threads in the package, at least `cores`
    pub threads: u32,

    /// Time-stamp counter frequency in Hz, 0 when calibration failed
    pub tsc_frequency: u64,
    /// Front-side bus (base clock) frequency in Hz, never 0
    pub fsb_frequency: u64,
    /// Core frequency in Hz
    pub cpu_frequency: u64,
    /// QPI link speed, 0 without a Nehalem-class uncore
    pub qpi_speed: u64,

    /// Maximum non-turbo ratio
    pub max_ratio: Ratio,
    /// Ratio in effect during the probe
    pub current_ratio: Ratio,

    /// Device class
    pub cpu_type: CpuType,
    /// Per-core turbo ratios, when requested and available
    pub turbo: Option<TurboRatios>,
}

impl PlatformCpuInfo {
    /// Vendor as an enum
    pub fn vendor(&self) -> CpuVendor {
        self.id.cpu_vendor()
    }

    /// Brand text
    pub fn brand(&self) -> &str {
        self.brand.as_str()
    }
}

impl fmt::Display for PlatformCpuInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = &self.id;
        writeln!(f, "CPU: Brandstring          : {}", self.brand())?;
        writeln!(
            f,
            "CPU: Vendor/Model/ExtModel: {} ({:#x})/{:#x}/{:#x}",
            self.vendor(),
            id.vendor,
            id.model,
            id.ext_model
        )?;
        writeln!(f, "CPU: Stepping / Signature : {:#x}/{:#x}", id.stepping, id.signature)?;
        writeln!(f, "CPU: Family/ExtFamily     : {:#x}/{:#x}", id.family, id.ext_family)?;
        writeln!(f, "CPU: Type                 : {}", self.cpu_type)?;
        writeln!(f, "CPU: Mobile CPU           : {}", self.mobile)?;
        writeln!(f, "CPU: NumCores/NumThreads  : {}/{}", self.cores, self.threads)?;
        if let Some(turbo) = &self.turbo {
            write!(f, "{turbo}")?;
        }
        writeln!(f, "CPU: Features             : {:#010x}", self.features)?;
        writeln!(f, "CPU: MaxCoef/CurrCoef     : {}/{}", self.max_ratio, self.current_ratio)?;
        writeln!(f, "CPU: TSCFreq              : {}MHz", self.tsc_frequency / 1_000_000)?;
        writeln!(f, "CPU: FSBFreq              : {}MHz", self.fsb_frequency / 1_000_000)?;
        writeln!(f, "CPU: CPUFreq              : {}MHz", self.cpu_frequency / 1_000_000)?;
        write!(f, "CPU: QPISpeed             : {}", self.qpi_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turbo_entries_follow_core_count() {
        let limit = TurboRatioLimit::from_raw(0x1A1A_1B1B_1C1D);

        let dual = TurboRatios::decode(limit, 2);
        assert_eq!(dual.as_slice(), &[0x1D, 0x1C]);

        let quad = TurboRatios::decode(limit, 4);
        assert_eq!(quad.as_slice(), &[0x1D, 0x1C, 0x1B, 0x1B]);

        let hex = TurboRatios::decode(limit, 6);
        assert_eq!(hex.as_slice(), &[0x1D, 0x1C, 0x1B, 0x1B, 0x1A, 0x1A]);
        assert_eq!(hex.ratio(6), Some(0x1A));
        assert_eq!(hex.ratio(0), None);
        assert_eq!(hex.ratio(7), None);

        // Eight-core parts still stop at six entries
        assert_eq!(TurboRatios::decode(limit, 8).as_slice().len(), MAX_TURBO_ENTRIES);
    }

    #[test]
    fn test_turbo_listing() {
        let turbo = TurboRatios::decode(TurboRatioLimit::from_raw(0x1B1C), 2);
        assert_eq!(
            turbo.to_string(),
            "CPU: Max Turbo with 1 core : 2800MHz\nCPU: Max Turbo with 2 cores: 2700MHz\n"
        );
    }
}
