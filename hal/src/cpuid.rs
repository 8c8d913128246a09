//! # CPUID Registers
//!
//! Result layout and leaf numbers for the identification instruction.

/// CPUID leaves read by the probe
pub mod leaf {
    /// Vendor ID and largest standard function
    pub const BASIC: u32 = 0x0000_0000;
    /// Version and feature information
    pub const VERSION_FEATURES: u32 = 0x0000_0001;
    /// Cache and TLB descriptors
    pub const CACHE_DESCRIPTORS: u32 = 0x0000_0002;
    /// Deterministic cache parameters
    pub const CACHE_PARAMETERS: u32 = 0x0000_0004;
    /// Largest extended function
    pub const EXTENDED_MAX: u32 = 0x8000_0000;
    /// Extended feature bits
    pub const EXTENDED_INFO: u32 = 0x8000_0001;
    /// Processor brand string, bytes 0..16
    pub const BRAND_STRING_1: u32 = 0x8000_0002;
    /// Processor brand string, bytes 16..32
    pub const BRAND_STRING_2: u32 = 0x8000_0003;
    /// Processor brand string, bytes 32..48
    pub const BRAND_STRING_3: u32 = 0x8000_0004;
}

/// Register selector within a CPUID result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuidReg {
    /// EAX
    Eax,
    /// EBX
    Ebx,
    /// ECX
    Ecx,
    /// EDX
    Edx,
}

/// The four registers returned by one CPUID invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuidResult {
    /// EAX
    pub eax: u32,
    /// EBX
    pub ebx: u32,
    /// ECX
    pub ecx: u32,
    /// EDX
    pub edx: u32,
}

impl CpuidResult {
    /// Build a result from raw register values
    pub const fn new(eax: u32, ebx: u32, ecx: u32, edx: u32) -> Self {
        Self { eax, ebx, ecx, edx }
    }

    /// Select one register
    #[inline]
    pub fn get(&self, reg: CpuidReg) -> u32 {
        match reg {
            CpuidReg::Eax => self.eax,
            CpuidReg::Ebx => self.ebx,
            CpuidReg::Ecx => self.ecx,
            CpuidReg::Edx => self.edx,
        }
    }

    /// Registers as little-endian bytes in EAX, EBX, ECX, EDX order
    ///
    /// This is the layout of the brand-string leaves.
    pub fn to_le_bytes(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        bytes[0..4].copy_from_slice(&self.eax.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.ebx.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.ecx.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.edx.to_le_bytes());
        bytes
    }

    /// Inverse of [`to_le_bytes`](Self::to_le_bytes)
    pub fn from_le_bytes(bytes: [u8; 16]) -> Self {
        let word = |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        Self::new(word(0), word(4), word(8), word(12))
    }
}

/// Extract bits `hi..=lo` of a 32-bit value
#[inline]
pub const fn bitfield32(value: u32, hi: u32, lo: u32) -> u32 {
    let width = hi - lo + 1;
    if width >= 32 {
        value >> lo
    } else {
        (value >> lo) & ((1 << width) - 1)
    }
}
