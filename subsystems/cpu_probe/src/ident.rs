//! # Processor Identification
//!
//! Cached CPUID leaves and the signature fields decoded from them.

use core::fmt;

use quartz_hal::cpuid::{bitfield32, leaf};
use quartz_hal::{Cpuid, CpuidReg, CpuidResult};

/// `"Genu"` as returned in leaf 0 EBX
pub const CPU_VENDOR_INTEL: u32 = 0x756E_6547;

/// `"Auth"` as returned in leaf 0 EBX
pub const CPU_VENDOR_AMD: u32 = 0x6874_7541;

// =============================================================================
// LEAF CACHE
// =============================================================================

/// Slot of a cached leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum CachedLeaf {
    /// Leaf 0
    Leaf0 = 0,
    /// Leaf 1
    Leaf1 = 1,
    /// Leaf 2
    Leaf2 = 2,
    /// Leaf 4, subleaf 0
    Leaf4 = 3,
    /// Leaf 0x80000000
    Leaf80 = 4,
    /// Leaf 0x80000001
    Leaf81 = 5,
}

/// Number of cached leaves
pub const CACHED_LEAVES: usize = 6;

/// CPUID leaves read once at the start of the probe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuidCache {
    leaves: [CpuidResult; CACHED_LEAVES],
}

impl CpuidCache {
    /// Read leaves 0, 1, 2, 4.0 and 0x80000000, plus 0x80000001 when
    /// the processor reports it
    pub fn read<C: Cpuid + ?Sized>(cpu: &mut C) -> Self {
        let mut leaves = [CpuidResult::default(); CACHED_LEAVES];
        leaves[CachedLeaf::Leaf0 as usize] = cpu.cpuid(leaf::BASIC, 0);
        leaves[CachedLeaf::Leaf1 as usize] = cpu.cpuid(leaf::VERSION_FEATURES, 0);
        leaves[CachedLeaf::Leaf2 as usize] = cpu.cpuid(leaf::CACHE_DESCRIPTORS, 0);
        leaves[CachedLeaf::Leaf4 as usize] = cpu.cpuid(leaf::CACHE_PARAMETERS, 0);
        leaves[CachedLeaf::Leaf80 as usize] = cpu.cpuid(leaf::EXTENDED_MAX, 0);

        if leaves[CachedLeaf::Leaf80 as usize].eax >= leaf::EXTENDED_INFO {
            leaves[CachedLeaf::Leaf81 as usize] = cpu.cpuid(leaf::EXTENDED_INFO, 0);
        }

        Self { leaves }
    }

    /// One register of a cached leaf
    #[inline]
    pub fn get(&self, leaf: CachedLeaf, reg: CpuidReg) -> u32 {
        self.leaves[leaf as usize].get(reg)
    }

    /// A whole cached leaf
    pub fn leaf(&self, leaf: CachedLeaf) -> CpuidResult {
        self.leaves[leaf as usize]
    }

    /// Largest extended function
    pub fn max_extended_leaf(&self) -> u32 {
        self.get(CachedLeaf::Leaf80, CpuidReg::Eax)
    }

    /// Union of the standard and extended feature bits
    pub fn feature_mask(&self) -> u32 {
        self.get(CachedLeaf::Leaf1, CpuidReg::Ecx)
            | self.get(CachedLeaf::Leaf1, CpuidReg::Edx)
            | self.get(CachedLeaf::Leaf81, CpuidReg::Ecx)
            | self.get(CachedLeaf::Leaf81, CpuidReg::Edx)
    }
}

// =============================================================================
// SIGNATURE
// =============================================================================

/// CPU vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuVendor {
    /// Intel processor
    Intel,
    /// AMD processor
    Amd,
    /// Unknown vendor
    Unknown,
}

impl CpuVendor {
    /// Decode the leaf 0 EBX vendor code
    pub fn from_code(code: u32) -> Self {
        match code {
            CPU_VENDOR_INTEL => CpuVendor::Intel,
            CPU_VENDOR_AMD => CpuVendor::Amd,
            _ => CpuVendor::Unknown,
        }
    }
}

impl fmt::Display for CpuVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CpuVendor::Intel => "Intel",
            CpuVendor::Amd => "AMD",
            CpuVendor::Unknown => "unknown",
        })
    }
}

/// Identification fields of leaves 0 and 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    /// Leaf 0 EBX vendor code
    pub vendor: u32,
    /// Raw leaf 1 EAX
    pub signature: u32,
    /// Stepping (bits 3:0)
    pub stepping: u8,
    /// Model with the extended model folded in
    pub model: u8,
    /// Family (bits 11:8)
    pub family: u8,
    /// Extended model (bits 19:16)
    pub ext_model: u8,
    /// Extended family (bits 27:20)
    pub ext_family: u8,
}

impl Signature {
    /// Decode from the cached leaves
    pub fn decode(cache: &CpuidCache) -> Self {
        let eax = cache.get(CachedLeaf::Leaf1, CpuidReg::Eax);
        let ext_model = bitfield32(eax, 19, 16) as u8;

        Self {
            vendor: cache.get(CachedLeaf::Leaf0, CpuidReg::Ebx),
            signature: eax,
            stepping: bitfield32(eax, 3, 0) as u8,
            model: bitfield32(eax, 7, 4) as u8 + (ext_model << 4),
            family: bitfield32(eax, 11, 8) as u8,
            ext_model,
            ext_family: bitfield32(eax, 27, 20) as u8,
        }
    }

    /// Vendor as an enum
    pub fn cpu_vendor(&self) -> CpuVendor {
        CpuVendor::from_code(self.vendor)
    }
}
