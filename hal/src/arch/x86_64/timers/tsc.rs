//! # Time-Stamp Counter
//!
//! RDTSC is not serializing. [`read`] fences first so a sample taken
//! right after polling port B is not hoisted above the port read.

use core::arch::x86_64::{_mm_lfence, _rdtsc};

/// Read the TSC once earlier loads have completed
#[inline]
pub fn read() -> u64 {
    // SAFETY: LFENCE and RDTSC are unprivileged and present on every
    // x86_64 processor
    unsafe {
        _mm_lfence();
        _rdtsc()
    }
}
