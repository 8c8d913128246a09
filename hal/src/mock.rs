//! # Scripted Mock Platform
//!
//! An in-memory [`Platform`](crate::Platform) for host-side tests.
//!
//! CPUID leaves, MSR values and configuration dwords are looked up in
//! fixed-capacity tables. The calibration timer replays a script of
//! [`TimerSample`]s, one per arm/poll cycle.
//!
//! Missing entries behave like the hardware they stand in for: unknown
//! CPUID leaves read as zero, unpopulated PCI functions read as all ones,
//! and unknown MSRs report [`HalError::MsrUnavailable`].

use heapless::Vec;

use crate::cpuid::{leaf, CpuidResult};
use crate::error::{HalError, HalResult};
use crate::pci::PciAddress;
use crate::platform::{CalibrationTimer, Cpuid, ModelSpecificRegisters, PciConfigSpace};

const MAX_LEAVES: usize = 32;
const MAX_MSRS: usize = 16;
const MAX_CONFIG: usize = 16;
const MAX_SAMPLES: usize = 16;

/// One scripted calibration run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSample {
    /// Value returned by `poll_gate`
    pub polls: u64,
    /// TSC read before arming
    pub tsc_start: u64,
    /// TSC read after expiry
    pub tsc_end: u64,
}

impl TimerSample {
    /// A run of `delta` ticks observed over `polls` polls
    pub const fn new(polls: u64, tsc_start: u64, tsc_end: u64) -> Self {
        Self {
            polls,
            tsc_start,
            tsc_end,
        }
    }

    /// A run starting at zero
    pub const fn delta(polls: u64, delta: u64) -> Self {
        Self::new(polls, 0, delta)
    }
}

/// Scripted platform
#[derive(Debug, Clone, Default)]
pub struct MockPlatform {
    leaves: Vec<(u32, u32, CpuidResult), MAX_LEAVES>,
    msrs: Vec<(u32, u64), MAX_MSRS>,
    config: Vec<(PciAddress, u16, u32), MAX_CONFIG>,
    samples: Vec<TimerSample, MAX_SAMPLES>,
    next_sample: usize,
    start_read: bool,
    armed: u32,
    last_latch: Option<u16>,
    gate_open: bool,
    msr_reads: u32,
}

impl MockPlatform {
    /// Empty platform: every CPUID leaf reads as zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the result of `leaf`/`subleaf`
    pub fn with_cpuid(mut self, leaf: u32, subleaf: u32, result: CpuidResult) -> Self {
        self.leaves.retain(|(l, s, _)| !(*l == leaf && *s == subleaf));
        assert!(
            self.leaves.push((leaf, subleaf, result)).is_ok(),
            "mock CPUID table full"
        );
        self
    }

    /// Fill the brand-string leaves from `brand`, NUL padded to 48 bytes
    pub fn with_brand_string(self, brand: &str) -> Self {
        let mut bytes = [0u8; 48];
        let len = brand.len().min(48);
        bytes[..len].copy_from_slice(&brand.as_bytes()[..len]);

        let mut this = self;
        for (i, leaf) in [leaf::BRAND_STRING_1, leaf::BRAND_STRING_2, leaf::BRAND_STRING_3]
            .into_iter()
            .enumerate()
        {
            let mut chunk = [0u8; 16];
            chunk.copy_from_slice(&bytes[i * 16..(i + 1) * 16]);
            this = this.with_cpuid(leaf, 0, CpuidResult::from_le_bytes(chunk));
        }
        this
    }

    /// Set the value of MSR `index`
    pub fn with_msr(mut self, index: u32, value: u64) -> Self {
        self.msrs.retain(|(i, _)| *i != index);
        assert!(self.msrs.push((index, value)).is_ok(), "mock MSR table full");
        self
    }

    /// Set the config dword at `offset` (dword aligned) of `addr`
    pub fn with_config32(mut self, addr: PciAddress, offset: u16, value: u32) -> Self {
        let offset = offset & !0x3;
        self.config.retain(|(a, o, _)| !(*a == addr && *o == offset));
        assert!(
            self.config.push((addr, offset, value)).is_ok(),
            "mock config table full"
        );
        self
    }

    /// Replace the timer script
    pub fn with_samples(mut self, samples: &[TimerSample]) -> Self {
        self.samples.clear();
        for sample in samples {
            assert!(self.samples.push(*sample).is_ok(), "mock timer script full");
        }
        self.next_sample = 0;
        self.start_read = false;
        self
    }

    /// Number of times the timer was armed
    pub fn armed_count(&self) -> u32 {
        self.armed
    }

    /// Latch passed to the most recent `arm`
    pub fn last_latch(&self) -> Option<u16> {
        self.last_latch
    }

    /// Whether the timer gate is currently open
    pub fn gate_open(&self) -> bool {
        self.gate_open
    }

    /// Number of MSR reads served, including failed ones
    pub fn msr_reads(&self) -> u32 {
        self.msr_reads
    }

    /// Rewind the timer script and counters
    pub fn reset_timer(&mut self) {
        self.next_sample = 0;
        self.start_read = false;
        self.armed = 0;
        self.last_latch = None;
        self.gate_open = false;
    }

    fn current_sample(&self) -> Option<&TimerSample> {
        self.samples.get(self.next_sample)
    }
}

impl Cpuid for MockPlatform {
    fn cpuid(&mut self, leaf: u32, subleaf: u32) -> CpuidResult {
        self.leaves
            .iter()
            .find(|(l, s, _)| *l == leaf && *s == subleaf)
            .map(|(_, _, r)| *r)
            .unwrap_or_default()
    }
}

impl ModelSpecificRegisters for MockPlatform {
    fn read_msr(&mut self, index: u32) -> HalResult<u64> {
        self.msr_reads += 1;
        self.msrs
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, v)| *v)
            .ok_or(HalError::MsrUnavailable(index))
    }
}

impl PciConfigSpace for MockPlatform {
    fn read_config32(&mut self, addr: PciAddress, offset: u16) -> HalResult<u32> {
        let offset = offset & !0x3;
        Ok(self
            .config
            .iter()
            .find(|(a, o, _)| *a == addr && *o == offset)
            .map(|(_, _, v)| *v)
            .unwrap_or(0xFFFF_FFFF))
    }
}

impl CalibrationTimer for MockPlatform {
    fn arm(&mut self, latch: u16) {
        self.armed += 1;
        self.last_latch = Some(latch);
        self.gate_open = true;
    }

    fn poll_gate(&mut self) -> u64 {
        self.current_sample().map_or(0, |s| s.polls)
    }

    fn disable(&mut self) {
        self.gate_open = false;
    }

    fn read_tsc(&mut self) -> u64 {
        let Some(sample) = self.current_sample().copied() else {
            return 0;
        };
        if self.start_read {
            self.start_read = false;
            self.next_sample += 1;
            sample.tsc_end
        } else {
            self.start_read = true;
            sample.tsc_start
        }
    }
}
