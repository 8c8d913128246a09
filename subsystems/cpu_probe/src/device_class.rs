//! # Device Class
//!
//! Processor class tag used later to pick a machine model. The values
//! match the SMBIOS type 131 processor-type codes.

use core::fmt;

/// Processor class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CpuType {
    /// Core Solo, a single core with a single thread
    CoreSolo = 0x0201,
    /// Core 2, Core Duo and Atom; the starting value
    #[default]
    Core2 = 0x0301,
    /// Quad-core Xeon and similar
    QuadCoreXeon = 0x0501,
    /// Core i5
    CoreI5 = 0x0601,
    /// Core i7, and any other Nehalem-class part
    CoreI7 = 0x0701,
    /// Core i7-2xxx (Sandy Bridge)
    CoreI7SandyBridge = 0x0307,
    /// Core i3
    CoreI3 = 0x0901,
}

/// Brand substrings and the tier they select, first match wins
const BRAND_TIERS: [(&str, CpuType); 3] = [
    ("Core(TM) i7-2", CpuType::CoreI7SandyBridge),
    ("Core(TM) i5", CpuType::CoreI5),
    ("Core(TM) i3", CpuType::CoreI3),
];

impl CpuType {
    /// Tier of a Nehalem-class part from its brand string
    pub fn from_brand(brand: &str) -> Self {
        BRAND_TIERS
            .iter()
            .find(|(marker, _)| brand.contains(marker))
            .map_or(CpuType::CoreI7, |(_, tier)| *tier)
    }

    /// Refine the starting class from the detected topology
    ///
    /// Only [`CpuType::Core2`] is refined; any class already chosen from
    /// the brand string is kept.
    pub fn refine(self, cores: u32, threads: u32) -> Self {
        match self {
            CpuType::Core2 if cores >= 4 => CpuType::QuadCoreXeon,
            CpuType::Core2 if cores == 1 && threads == 1 => CpuType::CoreSolo,
            other => other,
        }
    }

    /// Numeric tag
    pub const fn code(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for CpuType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brand_tiers() {
        assert_eq!(
            CpuType::from_brand("Intel(R) Core(TM) i7-2600K CPU @ 3.40GHz"),
            CpuType::CoreI7SandyBridge
        );
        assert_eq!(CpuType::from_brand("Intel(R) Core(TM) i5 CPU 750 @ 2.67GHz"), CpuType::CoreI5);
        assert_eq!(
            CpuType::from_brand("Intel(R) Core(TM) i5-2500K CPU @ 3.30GHz"),
            CpuType::CoreI5
        );
        assert_eq!(CpuType::from_brand("Intel(R) Core(TM) i3 CPU 530 @ 2.93GHz"), CpuType::CoreI3);
        assert_eq!(CpuType::from_brand("Intel(R) Core(TM) i7 CPU 920 @ 2.67GHz"), CpuType::CoreI7);
        assert_eq!(CpuType::from_brand("Intel(R) Xeon(R) CPU X5670 @ 2.93GHz"), CpuType::CoreI7);
        assert_eq!(CpuType::from_brand(""), CpuType::CoreI7);
    }

    #[test]
    fn test_topology_refinement() {
        assert_eq!(CpuType::Core2.refine(4, 4), CpuType::QuadCoreXeon);
        assert_eq!(CpuType::Core2.refine(6, 12), CpuType::QuadCoreXeon);
        assert_eq!(CpuType::Core2.refine(1, 1), CpuType::CoreSolo);
        assert_eq!(CpuType::Core2.refine(1, 2), CpuType::Core2);
        assert_eq!(CpuType::Core2.refine(2, 2), CpuType::Core2);
        assert_eq!(CpuType::Core2.refine(0, 0), CpuType::Core2);
        // Brand-derived classes are never overridden
        assert_eq!(CpuType::CoreI5.refine(4, 8), CpuType::CoreI5);
        assert_eq!(CpuType::CoreI3.refine(1, 1), CpuType::CoreI3);
    }

    #[test]
    fn test_codes() {
        assert_eq!(CpuType::default().code(), 0x301);
        assert_eq!(CpuType::CoreI7SandyBridge.code(), 0x307);
        assert_eq!(CpuType::CoreI3.to_string(), "0x901");
    }
}
