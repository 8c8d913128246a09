//! Bus ratios with an optional half step.

use core::fmt;

/// Bus-to-core multiplier, `coef` or `coef + 0.5`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ratio {
    /// Integer part
    pub coef: u8,
    /// Extra half step
    pub half_step: bool,
}

impl Ratio {
    /// New ratio
    pub const fn new(coef: u8, half_step: bool) -> Self {
        Self { coef, half_step }
    }

    /// Whole-number ratio
    pub const fn whole(coef: u8) -> Self {
        Self::new(coef, false)
    }

    /// Ratio is zero and cannot divide anything
    pub fn is_zero(&self) -> bool {
        self.coef == 0
    }

    /// Twice the ratio, as an integer
    pub fn doubled(&self) -> u64 {
        u64::from(self.coef) * 2 + u64::from(self.half_step)
    }

    /// Bus frequency that runs at `core_hz` through this ratio
    ///
    /// `None` for a zero ratio.
    pub fn bus_from(&self, core_hz: u64) -> Option<u64> {
        if self.is_zero() {
            return None;
        }
        if self.half_step {
            Some(core_hz * 2 / self.doubled())
        } else {
            Some(core_hz / u64::from(self.coef))
        }
    }

    /// Core frequency obtained from `bus_hz` through this ratio
    pub fn core_from(&self, bus_hz: u64) -> u64 {
        if self.half_step {
            bus_hz * self.doubled() / 2
        } else {
            bus_hz * u64::from(self.coef)
        }
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.coef)?;
        if self.half_step {
            f.write_str(".5")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Ratio::whole(20).to_string(), "20");
        assert_eq!(Ratio::new(9, true).to_string(), "9.5");
    }

    #[test]
    fn test_half_step_scaling() {
        // 2.833 GHz Core 2 at 9.5 x 333 MHz
        let tsc = 3_166_666_666;
        let max = Ratio::new(9, true);
        let bus = max.bus_from(tsc).unwrap();
        assert_eq!(bus, 333_333_333);
        assert_eq!(Ratio::new(8, true).core_from(bus), 2_833_333_330);
        assert_eq!(Ratio::whole(6).core_from(bus), 1_999_999_998);
    }

    #[test]
    fn test_zero_ratio() {
        assert_eq!(Ratio::default().bus_from(1_000_000), None);
        assert!(Ratio::new(0, true).is_zero());
    }
}
