//! # RDMSR
//!
//! Executes the instruction only. Register layouts and decoders live in
//! [`crate::msr`].

use core::arch::asm;

/// Read MSR `index`
///
/// # Safety
///
/// Ring 0 only. An index the processor does not implement raises #GP.
#[inline]
pub unsafe fn rdmsr(index: u32) -> u64 {
    let eax: u32;
    let edx: u32;
    // SAFETY: privilege level and index validity are upheld by the caller
    unsafe {
        asm!(
            "rdmsr",
            in("ecx") index,
            out("eax") eax,
            out("edx") edx,
            options(nomem, nostack, preserves_flags),
        );
    }
    u64::from(edx) << 32 | u64::from(eax)
}
