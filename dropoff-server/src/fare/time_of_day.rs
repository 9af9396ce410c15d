//! Time-of-day demand multipliers.
//!
//! The multiplier is resolved upstream from an explicit hour and folded
//! into the surge passed to [`super::estimate`], which never reads a clock.

use serde::{Deserialize, Serialize};

/// A half-open hour window `[start_hour, end_hour)` with a multiplier.
///
/// Windows may wrap midnight (`start_hour > end_hour`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakWindow {
    pub start_hour: u32,
    pub end_hour: u32,
    pub multiplier: f64,
}

impl PeakWindow {
    fn covers(&self, hour: u32) -> bool {
        if self.start_hour <= self.end_hour {
            (self.start_hour..self.end_hour).contains(&hour)
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }
}

/// Hour-of-day multiplier table. The largest matching window wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeOfDayPolicy {
    pub windows: Vec<PeakWindow>,
}

impl TimeOfDayPolicy {
    /// Multiplier for `hour` (0..24). Hours outside every window give 1.0.
    pub fn multiplier(&self, hour: u32) -> f64 {
        self.windows
            .iter()
            .filter(|w| w.covers(hour % 24))
            .map(|w| w.multiplier)
            .fold(1.0, f64::max)
    }
}

impl Default for TimeOfDayPolicy {
    fn default() -> Self {
        Self {
            windows: vec![
                PeakWindow {
                    start_hour: 7,
                    end_hour: 10,
                    multiplier: 1.10,
                },
                PeakWindow {
                    start_hour: 16,
                    end_hour: 19,
                    multiplier: 1.15,
                },
                PeakWindow {
                    start_hour: 23,
                    end_hour: 3,
                    multiplier: 1.05,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_peak_is_neutral() {
        let policy = TimeOfDayPolicy::default();
        assert_eq!(policy.multiplier(12), 1.0);
        assert_eq!(policy.multiplier(10), 1.0);
    }

    #[test]
    fn peak_windows() {
        let policy = TimeOfDayPolicy::default();
        assert_eq!(policy.multiplier(7), 1.10);
        assert_eq!(policy.multiplier(18), 1.15);
    }

    #[test]
    fn wraps_midnight() {
        let policy = TimeOfDayPolicy::default();
        assert_eq!(policy.multiplier(23), 1.05);
        assert_eq!(policy.multiplier(0), 1.05);
        assert_eq!(policy.multiplier(2), 1.05);
        assert_eq!(policy.multiplier(3), 1.0);
    }

    #[test]
    fn empty_policy() {
        let policy = TimeOfDayPolicy { windows: vec![] };
        assert_eq!(policy.multiplier(8), 1.0);
    }
}
