//! # TSC Calibration
//!
//! Counts how many TSC ticks elapse while PIT channel 2 counts down a
//! fixed window, and converts the smallest plausible count to Hz.
//!
//! Taking the minimum over several runs biases the result toward the
//! lowest tick count observed. Under a hypervisor that does not
//! virtualize the TSC, stolen time can only inflate a run, never shrink
//! it.

use log::{trace, warn};
use quartz_hal::CalibrationTimer;

use crate::config::CalibrationConfig;

/// Deltas above this cannot be scaled to Hz with enough headroom
pub const MAX_CALIBRATION_DELTA: u64 = 1 << 32;

/// Measure the TSC frequency in Hz
///
/// Returns 0 when no run was usable or the smallest delta exceeds
/// [`MAX_CALIBRATION_DELTA`]. The timer is left disabled either way.
///
/// A run is discarded when the gate was observed expired on the first
/// poll (the timer never ran) or when the TSC advanced no more than once
/// per millisecond.
pub fn calibrate_tsc<T: CalibrationTimer + ?Sized>(timer: &mut T, config: &CalibrationConfig) -> u64 {
    let mut best: Option<u64> = None;

    for attempt in 0..config.attempts {
        timer.arm(config.latch);
        let start = timer.read_tsc();
        let polls = timer.poll_gate();
        let end = timer.read_tsc();
        let delta = end.wrapping_sub(start);

        if polls <= 1 {
            trace!("TSC: run {attempt} discarded, gate expired after {polls} polls");
            continue;
        }
        if delta <= config.window_ms {
            trace!("TSC: run {attempt} discarded, delta {delta} too small");
            continue;
        }

        trace!("TSC: run {attempt} delta {delta} over {polls} polls");
        best = Some(best.map_or(delta, |b| b.min(delta)));
    }

    timer.disable();

    match best {
        Some(delta) if delta <= MAX_CALIBRATION_DELTA => delta * 1000 / config.window_ms,
        Some(delta) => {
            warn!("TSC: minimum delta {delta} out of range, calibration failed");
            0
        },
        None => {
            warn!("TSC: no usable calibration run");
            0
        },
    }
}
