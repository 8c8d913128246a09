//! # x86_64 Core Module
//!
//! Processor identification and model-specific register instructions.
//!
//! - [`cpuid`]: the CPUID instruction
//! - [`msr`]: RDMSR

pub mod cpuid;
pub mod msr;
