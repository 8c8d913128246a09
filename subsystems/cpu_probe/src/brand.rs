//! # Processor Brand String
//!
//! The 48-byte string of leaves 0x80000002..=0x80000004, with leading
//! padding removed. Also carries the mobile-part heuristic, which is the
//! only thing the probe reads out of the marketing name besides the
//! device-class tier.

use heapless::String;
use quartz_hal::cpuid::leaf;
use quartz_hal::Cpuid;
use static_assertions::const_assert_eq;

use crate::ident::CpuidCache;

/// Brand string length in bytes
pub const BRAND_STRING_LEN: usize = 48;

const_assert_eq!(BRAND_STRING_LEN, 3 * 16);

/// Brand text
pub type BrandString = String<BRAND_STRING_LEN>;

/// Firmware-programmed brand string meaning "could not identify"
pub const CPU_STRING_UNKNOWN: &str = "Unknown CPU Typ";

/// Substrings marking a mobile part
const MOBILE_MARKERS: [&str; 2] = ["Atom", "Mobile"];

/// Core i mobile parts carry a standalone "M" token
const MOBILE_TOKEN: &str = " M ";

/// Decoded brand string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Brand {
    /// Brand text, empty when unavailable or indeterminate
    pub text: BrandString,
    /// Mobile part
    pub mobile: bool,
}

impl Brand {
    /// Read the brand leaves, if the processor implements them
    pub fn read<C: Cpuid + ?Sized>(cpu: &mut C, cache: &CpuidCache) -> Option<Self> {
        if cache.max_extended_leaf() < leaf::BRAND_STRING_3 {
            return None;
        }

        let mut raw = [0u8; BRAND_STRING_LEN];
        for (i, leaf) in [leaf::BRAND_STRING_1, leaf::BRAND_STRING_2, leaf::BRAND_STRING_3]
            .into_iter()
            .enumerate()
        {
            raw[i * 16..(i + 1) * 16].copy_from_slice(&cpu.cpuid(leaf, 0).to_le_bytes());
        }

        Some(Self::decode(&raw))
    }

    /// Decode raw brand bytes
    ///
    /// The text ends at the first NUL. Bytes that are not valid UTF-8 end
    /// it too, since the string is specified as ASCII.
    pub fn decode(raw: &[u8; BRAND_STRING_LEN]) -> Self {
        let end = raw.iter().position(|&c| c == 0).unwrap_or(BRAND_STRING_LEN);
        let bytes = &raw[..end];
        let text = match core::str::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => core::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or_default(),
        };
        let text = text.trim_start_matches(' ');

        let mobile = MOBILE_MARKERS.iter().any(|m| text.contains(m)) || text.contains(MOBILE_TOKEN);

        let mut brand = Self {
            text: BrandString::new(),
            mobile,
        };
        if text != CPU_STRING_UNKNOWN {
            // Cannot overflow: text is a slice of a 48-byte buffer
            let _ = brand.text.push_str(text);
        }
        brand
    }

    /// Brand text
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }
}
