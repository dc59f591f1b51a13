//! Volume level with validated updates
//!
//! Volume range is 0-100%, mapped to -60 dB to 0 dB for gain display.

use serde::{Deserialize, Serialize};

/// Volume level (0-100)
///
/// Updates outside the range are refused rather than clamped, so a bad
/// request leaves the previous level in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Volume {
    level: u8,
}

impl Volume {
    /// Highest accepted level
    pub const MAX: u8 = 100;

    /// Create a volume, clamping the initial level to 100
    pub fn new(level: u8) -> Self {
        Self {
            level: level.min(Self::MAX),
        }
    }

    /// Set level if it is within 0-100
    ///
    /// Returns false and keeps the current level otherwise.
    pub fn try_set(&mut self, level: u8) -> bool {
        if level > Self::MAX {
            return false;
        }
        self.level = level;
        true
    }

    /// Current level (0-100)
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Linear gain multiplier for this level
    ///
    /// Formula: gain = 10^((level% - 100) * 0.6 / 20)
    /// - 0%   → silence
    /// - 50%  → -30 dB → 0.0316
    /// - 100% →   0 dB → 1.0
    pub fn gain(&self) -> f32 {
        if self.level == 0 {
            return 0.0;
        }

        let db = (f32::from(self.level) - 100.0) * 0.6;
        10.0_f32.powf(db / 20.0)
    }

    /// Level expressed in dB (-60 dB floor)
    pub fn to_db(&self) -> f32 {
        if self.level == 0 {
            -60.0
        } else {
            20.0 * self.gain().log10()
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(Self::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_full_volume() {
        assert_eq!(Volume::default().level(), 100);
    }

    #[test]
    fn new_clamps_initial_level() {
        assert_eq!(Volume::new(150).level(), 100);
        assert_eq!(Volume::new(42).level(), 42);
    }

    #[test]
    fn try_set_rejects_out_of_range() {
        let mut vol = Volume::new(80);

        assert!(vol.try_set(0));
        assert_eq!(vol.level(), 0);

        assert!(vol.try_set(100));
        assert_eq!(vol.level(), 100);

        assert!(!vol.try_set(101));
        assert_eq!(vol.level(), 100);

        assert!(!vol.try_set(u8::MAX));
        assert_eq!(vol.level(), 100);
    }

    #[test]
    fn gain_calculation() {
        assert_eq!(Volume::new(0).gain(), 0.0);
        assert!((Volume::new(100).gain() - 1.0).abs() < 0.001);
        assert!((Volume::new(50).gain() - 0.0316).abs() < 0.001);
    }

    #[test]
    fn db_conversion() {
        assert!(Volume::new(100).to_db().abs() < 0.1);
        assert!((Volume::new(0).to_db() + 60.0).abs() < 0.1);
        assert!((Volume::new(50).to_db() + 30.0).abs() < 0.1);
    }
}
