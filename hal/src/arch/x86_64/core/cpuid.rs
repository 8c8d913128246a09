//! # CPUID Instruction

use crate::cpuid::CpuidResult;

/// Execute CPUID with an explicit subleaf
///
/// RBX is reserved by LLVM, so it is saved around the instruction.
#[inline]
pub fn cpuid(leaf: u32, subleaf: u32) -> CpuidResult {
    let (eax, ebx, ecx, edx): (u32, u32, u32, u32);
    unsafe {
        core::arch::asm!(
            "mov {tmp:r}, rbx",
            "cpuid",
            "xchg {tmp:r}, rbx",
            tmp = out(reg) ebx,
            inout("eax") leaf => eax,
            inout("ecx") subleaf => ecx,
            out("edx") edx,
            options(nostack, preserves_flags),
        );
    }
    CpuidResult::new(eax, ebx, ecx, edx)
}
