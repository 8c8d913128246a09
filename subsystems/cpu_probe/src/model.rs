//! # Processor Generation Table
//!
//! Which register layout describes the ratio and topology of a given
//! Intel family/model. All per-model knowledge lives in
//! [`STRATEGY_TABLE`]; models missing from it fall back to
//! IA32_PERF_STATUS decoding.

/// Intel family 6 model numbers (extended model folded in)
pub mod cpu_model {
    /// Nehalem (Bloomfield, Core i7 9xx)
    pub const NEHALEM: u8 = 0x1A;
    /// Lynnfield/Clarksfield (Core i5/i7 7xx/8xx)
    pub const FIELDS: u8 = 0x1E;
    /// Havendale/Auburndale
    pub const DALES: u8 = 0x1F;
    /// Clarkdale/Arrandale (Core i3/i5 32nm)
    pub const DALES_32NM: u8 = 0x25;
    /// Sandy Bridge
    pub const SB_CORE: u8 = 0x2A;
    /// Westmere (Gulftown, Westmere-EP)
    pub const WESTMERE: u8 = 0x2C;
    /// Nehalem-EX (Beckton)
    pub const NEHALEM_EX: u8 = 0x2E;
    /// Westmere-EX
    pub const WESTMERE_EX: u8 = 0x2F;
}

/// How ratio and topology are decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStrategy {
    /// MSR_CORE_THREAD_COUNT with cores in bits 19:16
    ///
    /// A0 silicon of these parts returns invalid data in bits 31:20.
    /// The core count cannot exceed 8 on them anyway.
    CoreThreadCountNarrow,
    /// MSR_CORE_THREAD_COUNT with cores in bits 31:16
    CoreThreadCountFull,
    /// IA32_PERF_STATUS ratios, CPUID leaf 1/4 topology
    PerfStatus,
}

impl DecodeStrategy {
    /// Highest bit of the core-count field, for the MSR strategies
    pub fn core_count_hi_bit(self) -> Option<u32> {
        match self {
            DecodeStrategy::CoreThreadCountNarrow => Some(19),
            DecodeStrategy::CoreThreadCountFull => Some(31),
            DecodeStrategy::PerfStatus => None,
        }
    }
}

/// One row of the generation table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelEntry {
    /// Family
    pub family: u8,
    /// Model with extended model folded in
    pub model: u8,
    /// Decoding strategy
    pub strategy: DecodeStrategy,
}

const fn entry(model: u8, strategy: DecodeStrategy) -> ModelEntry {
    ModelEntry {
        family: 0x06,
        model,
        strategy,
    }
}

/// Models decoded through MSR_CORE_THREAD_COUNT
pub const STRATEGY_TABLE: [ModelEntry; 8] = [
    entry(cpu_model::DALES_32NM, DecodeStrategy::CoreThreadCountNarrow),
    entry(cpu_model::WESTMERE, DecodeStrategy::CoreThreadCountNarrow),
    entry(cpu_model::WESTMERE_EX, DecodeStrategy::CoreThreadCountNarrow),
    entry(cpu_model::SB_CORE, DecodeStrategy::CoreThreadCountNarrow),
    entry(cpu_model::NEHALEM, DecodeStrategy::CoreThreadCountFull),
    entry(cpu_model::FIELDS, DecodeStrategy::CoreThreadCountFull),
    entry(cpu_model::DALES, DecodeStrategy::CoreThreadCountFull),
    entry(cpu_model::NEHALEM_EX, DecodeStrategy::CoreThreadCountFull),
];

/// Family/model is recent enough for any register decoding
///
/// Family 6 from model 0x0C (Core) on, or NetBurst from model 3.
pub fn has_ratio_registers(family: u8, model: u8) -> bool {
    (family == 0x06 && model >= 0x0C) || (family == 0x0F && model >= 0x03)
}

/// IA32_PERF_STATUS carries a maximum-ratio field
///
/// On older models the current ratio is what the TSC runs at.
pub fn reports_max_ratio(family: u8, model: u8) -> bool {
    (family == 0x06 && model >= 0x0E) || family == 0x0F
}

/// Strategy for an Intel processor, `None` when it predates the ratio
/// registers
pub fn strategy_for(family: u8, model: u8) -> Option<DecodeStrategy> {
    if !has_ratio_registers(family, model) {
        return None;
    }

    let strategy = STRATEGY_TABLE
        .iter()
        .find(|e| e.family == family && e.model == model)
        .map_or(DecodeStrategy::PerfStatus, |e| e.strategy);
    Some(strategy)
}
