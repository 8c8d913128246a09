//! # Port I/O

use core::arch::asm;

/// Write a byte to an I/O port
///
/// # Safety
/// The port write must not violate the device's protocol.
#[inline]
pub unsafe fn outb(port: u16, value: u8) {
    unsafe {
        asm!(
            "out dx, al",
            in("dx") port,
            in("al") value,
            options(nostack, nomem, preserves_flags),
        );
    }
}

/// Read a byte from an I/O port
///
/// # Safety
/// Reading some ports has side effects.
#[inline]
pub unsafe fn inb(port: u16) -> u8 {
    let value: u8;
    unsafe {
        asm!(
            "in al, dx",
            in("dx") port,
            out("al") value,
            options(nostack, nomem, preserves_flags),
        );
    }
    value
}

/// Write a dword to an I/O port
///
/// # Safety
/// The port write must not violate the device's protocol.
#[inline]
pub unsafe fn outl(port: u16, value: u32) {
    unsafe {
        asm!(
            "out dx, eax",
            in("dx") port,
            in("eax") value,
            options(nostack, nomem, preserves_flags),
        );
    }
}

/// Read a dword from an I/O port
///
/// # Safety
/// Reading some ports has side effects.
#[inline]
pub unsafe fn inl(port: u16) -> u32 {
    let value: u32;
    unsafe {
        asm!(
            "in eax, dx",
            in("dx") port,
            out("eax") value,
            options(nostack, nomem, preserves_flags),
        );
    }
    value
}
