//! Fare estimation from trip distance and duration.

use serde::{Deserialize, Serialize};

const METERS_PER_MILE: f64 = 1_609.344;

/// Per-trip pricing inputs, in USD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ratecard {
    pub base_fee: f64,
    pub per_mile: f64,
    pub per_minute: f64,
    /// Flat booking/service fee added before surge.
    pub service_fee: f64,
    pub minimum_fare: f64,
}

impl Default for Ratecard {
    fn default() -> Self {
        Self {
            base_fee: 2.25,
            per_mile: 1.50,
            per_minute: 0.33,
            service_fee: 1.20,
            minimum_fare: 5.00,
        }
    }
}

/// Width of the quoted price band around the center estimate.
///
/// The band widens once the surge multiplier reaches `elevated_at`:
///
/// | surge            | low        | high        |
/// |------------------|------------|-------------|
/// | `< elevated_at`  | `low`      | `high`      |
/// | `>= elevated_at` | `elevated_low` | `elevated_high` |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandPolicy {
    pub low: f64,
    pub high: f64,
    pub elevated_at: f64,
    pub elevated_low: f64,
    pub elevated_high: f64,
}

impl BandPolicy {
    /// Band fractions `(below, above)` for a given surge multiplier.
    pub fn bands(&self, surge: f64) -> (f64, f64) {
        if surge >= self.elevated_at {
            (self.elevated_low, self.elevated_high)
        } else {
            (self.low, self.high)
        }
    }
}

impl Default for BandPolicy {
    fn default() -> Self {
        Self {
            low: 0.10,
            high: 0.12,
            elevated_at: 1.15,
            elevated_low: 0.12,
            elevated_high: 0.20,
        }
    }
}

/// A fare range in USD. Always satisfies `low <= center <= high`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FareQuote {
    pub low: f64,
    pub center: f64,
    pub high: f64,
}

/// Estimate the fare for a trip.
///
/// Pure: identical arguments always produce an identical quote. Any
/// time-of-day or zone adjustment arrives through `surge` and `penalty_usd`.
pub fn estimate(
    ratecard: &Ratecard,
    bands: &BandPolicy,
    distance_m: f64,
    duration_s: f64,
    surge: f64,
    penalty_usd: f64,
) -> FareQuote {
    let miles = distance_m / METERS_PER_MILE;
    let minutes = duration_s / 60.0;

    let raw = (ratecard.base_fee
        + ratecard.per_mile * miles
        + ratecard.per_minute * minutes
        + ratecard.service_fee)
        * surge
        + penalty_usd;

    let center = raw.max(ratecard.minimum_fare);
    let (below, above) = bands.bands(surge);
    let low = (center * (1.0 - below)).max(ratecard.minimum_fare).min(center);
    let high = (center * (1.0 + above)).max(center);

    FareQuote { low, center, high }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn ratecard() -> impl Strategy<Value = Ratecard> {
        (0.0f64..5.0, 0.0f64..4.0, 0.0f64..1.0, 0.0f64..3.0, 0.0f64..15.0).prop_map(
            |(base_fee, per_mile, per_minute, service_fee, minimum_fare)| Ratecard {
                base_fee,
                per_mile,
                per_minute,
                service_fee,
                minimum_fare,
            },
        )
    }

    proptest! {
        #[test]
        fn ordered_and_floored(
            rc in ratecard(),
            distance in 0.0f64..100_000.0,
            duration in 0.0f64..10_000.0,
            surge in 1.0f64..2.0,
            penalty in 0.0f64..20.0,
        ) {
            let q = estimate(&rc, &BandPolicy::default(), distance, duration, surge, penalty);
            prop_assert!(q.low <= q.center);
            prop_assert!(q.center <= q.high);
            prop_assert!(q.low >= rc.minimum_fare);
        }

        #[test]
        fn referentially_transparent(
            distance in 0.0f64..100_000.0,
            duration in 0.0f64..10_000.0,
            surge in 1.0f64..2.0,
            penalty in 0.0f64..20.0,
        ) {
            let rc = Ratecard::default();
            let bands = BandPolicy::default();
            let a = estimate(&rc, &bands, distance, duration, surge, penalty);
            let b = estimate(&rc, &bands, distance, duration, surge, penalty);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn longer_trips_never_cheaper(
            distance in 0.0f64..50_000.0,
            extra in 0.0f64..50_000.0,
            duration in 0.0f64..5_000.0,
        ) {
            let rc = Ratecard::default();
            let bands = BandPolicy::default();
            let short = estimate(&rc, &bands, distance, duration, 1.0, 0.0);
            let long = estimate(&rc, &bands, distance + extra, duration, 1.0, 0.0);
            prop_assert!(long.center >= short.center);
        }
    }
}
