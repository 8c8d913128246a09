//! # Architecture Backends
//!
//! Instruction-level implementations of the platform traits.

pub mod x86_64;
