//! # QPI Link Speed
//!
//! Nehalem-class uncores expose the QPI multiplier in the configuration
//! space of a device on one of the high "uncore" buses. The bus number
//! depends on the socket count, so each candidate is checked for an
//! Intel memory controller first.

use log::debug;
use quartz_hal::pci::{offset, VENDOR_INTEL};
use quartz_hal::{HalResult, PciAddress, PciConfigSpace};

/// Uncore bus numbers, in probe order
pub const UNCORE_BUSES: [u8; 3] = [0xFF, 0x7F, 0x3F];

/// Memory controller device on the uncore bus
pub const MCH_DEVICE: u8 = 3;
/// Memory controller function
pub const MCH_FUNCTION: u8 = 4;

/// Lowest memory controller device id of a Nehalem-class uncore
pub const MCH_MIN_DEVICE_ID: u16 = 0x2C00;

/// QPI link device
pub const QPI_DEVICE: u8 = 2;
/// QPI link function
pub const QPI_FUNCTION: u8 = 1;

/// QPI link control register holding the multiplier
pub const QPI_LINK_CONTROL: u16 = 0x50;

/// Multiplier field of [`QPI_LINK_CONTROL`]
pub const QPI_MULT_MASK: u32 = 0x7F;

/// Locate the uncore bus
///
/// Every candidate is checked and the last qualifying one is returned.
pub fn find_uncore_bus<P: PciConfigSpace + ?Sized>(pci: &mut P) -> HalResult<Option<u8>> {
    let mut found = None;

    for bus in UNCORE_BUSES {
        let mch = PciAddress::new(bus, MCH_DEVICE, MCH_FUNCTION);
        let vendor = pci.read_config16(mch, offset::VENDOR_ID)?;
        let device = pci.read_config16(mch, offset::DEVICE_ID)? & 0xFF00;

        if vendor == VENDOR_INTEL && device >= MCH_MIN_DEVICE_ID {
            found = Some(bus);
        }
    }

    Ok(found)
}

/// Round to the nearest 100, halves up
pub fn round_link_speed(speed: u64) -> u64 {
    if speed % 100 == 0 {
        speed
    } else {
        (speed + 50) / 100 * 100
    }
}

/// QPI speed for a bus clock of `fsb_hz`, 0 without a Nehalem-class
/// uncore
pub fn probe_link_speed<P: PciConfigSpace + ?Sized>(pci: &mut P, fsb_hz: u64) -> HalResult<u64> {
    let Some(bus) = find_uncore_bus(pci)? else {
        debug!("QPI: no uncore memory controller found");
        return Ok(0);
    };

    let link = PciAddress::new(bus, QPI_DEVICE, QPI_FUNCTION);
    let mult = pci.read_config32(link, QPI_LINK_CONTROL)? & QPI_MULT_MASK;
    let speed = round_link_speed(u64::from(mult) * 2 * (fsb_hz / 1_000_000));

    debug!("QPI: uncore on bus {bus:#x}, multiplier {mult}, speed {speed}");
    Ok(speed)
}
