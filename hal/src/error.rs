//! # Error Types
//!
//! Failures reported by the register-access primitives.

use core::fmt;

use crate::pci::PciAddress;

/// Result type for hardware access
pub type HalResult<T> = Result<T, HalError>;

/// Hardware access errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    /// The model-specific register cannot be read on this platform
    MsrUnavailable(u32),
    /// Configuration space access is not available
    ConfigSpaceUnavailable {
        /// Device the read was addressed to
        addr: PciAddress,
        /// Register offset within the function's config space
        offset: u16,
    },
    /// PIT channel 2 is already claimed by another user
    TimerBusy,
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MsrUnavailable(index) => write!(f, "MSR {index:#x} is not readable"),
            Self::ConfigSpaceUnavailable { addr, offset } => {
                write!(f, "config space {addr} offset {offset:#x} is not readable")
            },
            Self::TimerBusy => write!(f, "PIT channel 2 is already in use"),
        }
    }
}
