//! Accepted drop-off candidates.

use std::fmt;

use serde::Serialize;

use crate::domain::{CoordKey, GeoPoint};
use crate::fare::FareQuote;

/// Constraint tier, strictest first.
///
/// The derived ordering is the relaxation order and also the ranking
/// priority of merged results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Shorter drive and a real saving against the baseline fare.
    Strict,
    /// Looser drive limits, no price gate.
    Relaxed,
    /// Anything walkable, ranked by proximity to the destination.
    Fallback,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Strict, Tier::Relaxed, Tier::Fallback];

    /// The next looser tier, if any.
    pub fn next(self) -> Option<Tier> {
        match self {
            Tier::Strict => Some(Tier::Relaxed),
            Tier::Relaxed => Some(Tier::Fallback),
            Tier::Fallback => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Strict => f.write_str("strict"),
            Tier::Relaxed => f.write_str("relaxed"),
            Tier::Fallback => f.write_str("fallback"),
        }
    }
}

/// Driving leg from the pickup to a drop-off point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DriveStats {
    pub distance_m: f64,
    pub duration_s: f64,
}

/// Walking leg from a drop-off point to the destination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WalkStats {
    pub distance_m: f64,
    pub duration_s: f64,
    /// True when the provider failed and the straight-line estimate was used.
    pub estimated: bool,
}

impl WalkStats {
    pub fn minutes(&self) -> f64 {
        self.duration_s / 60.0
    }
}

/// A suggested drop-off point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub drop_point: GeoPoint,
    /// Great-circle distance from the drop-off to the destination.
    pub radial_m: f64,
    pub walk: WalkStats,
    pub drive: DriveStats,
    pub fare: FareQuote,
    /// Baseline fare minus this fare, floored at zero.
    pub savings_usd: f64,
    pub source_route: String,
    pub tier: Tier,
    /// Reverse-geocoded label, filled in after ranking. May be empty.
    pub label: String,
}

impl Candidate {
    pub fn walk_minutes(&self) -> f64 {
        self.walk.minutes()
    }

    /// Duplicate-detection key.
    pub fn key(&self, decimals: u32) -> CoordKey {
        CoordKey::new(&self.drop_point, decimals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_order() {
        assert!(Tier::Strict < Tier::Relaxed);
        assert!(Tier::Relaxed < Tier::Fallback);
        assert_eq!(Tier::Strict.next(), Some(Tier::Relaxed));
        assert_eq!(Tier::Fallback.next(), None);
        assert_eq!(Tier::ALL.len(), 3);
    }

    #[test]
    fn tier_names() {
        assert_eq!(Tier::Relaxed.to_string(), "relaxed");
        assert_eq!(serde_json::to_string(&Tier::Fallback).unwrap(), "\"fallback\"");
    }

    #[test]
    fn walk_minutes() {
        let walk = WalkStats {
            distance_m: 400.0,
            duration_s: 300.0,
            estimated: false,
        };
        assert_eq!(walk.minutes(), 5.0);
    }
}
