//! # PCI Configuration Addresses
//!
//! Bus/device/function addressing for configuration mechanism #1
//! (ports 0xCF8/0xCFC).

use core::fmt;

/// Configuration address port
pub const CONFIG_ADDRESS: u16 = 0xCF8;

/// Configuration data port
pub const CONFIG_DATA: u16 = 0xCFC;

/// Standard header offsets
pub mod offset {
    /// Vendor ID (16-bit)
    pub const VENDOR_ID: u16 = 0x00;
    /// Device ID (16-bit)
    pub const DEVICE_ID: u16 = 0x02;
}

/// Intel's PCI vendor ID
pub const VENDOR_INTEL: u16 = 0x8086;

/// Location of a PCI function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PciAddress {
    /// Bus number
    pub bus: u8,
    /// Device number (0-31)
    pub device: u8,
    /// Function number (0-7)
    pub function: u8,
}

impl PciAddress {
    /// Create an address; device and function are masked to their widths
    pub const fn new(bus: u8, device: u8, function: u8) -> Self {
        Self {
            bus,
            device: device & 0x1F,
            function: function & 0x07,
        }
    }

    /// Value written to CONFIG_ADDRESS to select `offset` of this function
    ///
    /// The offset is dword aligned; sub-dword reads shift the data port value.
    pub const fn config_address(&self, offset: u16) -> u32 {
        0x8000_0000
            | ((self.bus as u32) << 16)
            | ((self.device as u32) << 11)
            | ((self.function as u32) << 8)
            | ((offset as u32) & 0xFC)
    }
}

impl fmt::Display for PciAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}:{:02x}.{}", self.bus, self.device, self.function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_address() {
        let addr = PciAddress::new(0xFF, 3, 4);
        assert_eq!(addr.config_address(0x00), 0x80FF_1C00);
        assert_eq!(addr.config_address(0x02), 0x80FF_1C00);

        let addr = PciAddress::new(0x3F, 2, 1);
        assert_eq!(addr.config_address(0x50), 0x803F_1150);
    }

    #[test]
    fn test_field_masking() {
        let addr = PciAddress::new(0, 0x3F, 0xF);
        assert_eq!(addr.device, 0x1F);
        assert_eq!(addr.function, 0x7);
    }
}
