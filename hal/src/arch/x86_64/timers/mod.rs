//! # x86_64 Timers
//!
//! The two clocks involved in calibration:
//!
//! - [`pit`]: channel 2 of the 8254, the reference with known frequency
//! - [`tsc`]: the time-stamp counter being measured

pub mod pit;
pub mod tsc;
