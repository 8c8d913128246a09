//! # PCI Configuration Mechanism #1

use super::io::{inl, outl};
use crate::pci::{PciAddress, CONFIG_ADDRESS, CONFIG_DATA};

/// Read a configuration dword
///
/// The address/data pair is not atomic; callers must be the only agent
/// using ports 0xCF8/0xCFC.
///
/// # Safety
/// Must run with I/O privilege.
pub unsafe fn read_config32(addr: PciAddress, offset: u16) -> u32 {
    unsafe {
        outl(CONFIG_ADDRESS, addr.config_address(offset));
        inl(CONFIG_DATA)
    }
}
