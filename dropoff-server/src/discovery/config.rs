//! Tuning configuration for drop-off discovery.
//!
//! Every threshold the engine applies lives here and is passed in by value;
//! nothing in the evaluation path hard-codes a number. Defaults are starting
//! points to be tuned, not contracts.

use serde::{Deserialize, Serialize};

use crate::fare::{BandPolicy, GeoFence, Ratecard, TimeOfDayPolicy};

use super::error::DiscoveryError;

/// Tail sampling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Points taken per route.
    pub count: usize,
    /// Trailing fraction of the geometry to sample from.
    pub tail_fraction: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            count: 16,
            tail_fraction: 0.22,
        }
    }
}

/// Route and suggestion caps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapsConfig {
    /// Fastest routes treated as Regular (fare baseline).
    pub regular_routes: usize,
    /// Further routes kept as Alternate.
    pub alternate_routes: usize,
    /// Candidates kept per source route within a tier.
    pub per_route: usize,
    /// Stop relaxing once this many suggestions are accumulated.
    pub min_suggestions: usize,
    /// Final output cap.
    pub max_suggestions: usize,
}

impl Default for CapsConfig {
    fn default() -> Self {
        Self {
            regular_routes: 2,
            alternate_routes: 3,
            per_route: 2,
            min_suggestions: 2,
            max_suggestions: 4,
        }
    }
}

/// Drive limits relative to the source route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierFactors {
    /// Candidate drive distance must be `<= distance_factor * route distance`.
    pub distance_factor: f64,
    /// Candidate drive duration must be `<= time_factor * route duration`.
    pub time_factor: f64,
}

/// Savings required by the Strict tier against the baseline fare.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceGate {
    /// Minimum absolute saving in USD.
    pub min_savings_usd: f64,
    /// Minimum saving as a fraction of the baseline (0.08 = 8%).
    pub min_savings_pct: f64,
}

impl Default for PriceGate {
    fn default() -> Self {
        Self {
            min_savings_usd: 1.0,
            min_savings_pct: 0.08,
        }
    }
}

/// Weights for the ascending tie-break cost of equal-savings candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TieBreak {
    pub per_km: f64,
    pub per_minute: f64,
}

impl Default for TieBreak {
    fn default() -> Self {
        Self {
            per_km: 1.0,
            per_minute: 1.0,
        }
    }
}

/// Clamp range for the traffic/free-flow surge proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurgeConfig {
    pub min: f64,
    pub max: f64,
}

impl Default for SurgeConfig {
    fn default() -> Self {
        Self { min: 1.0, max: 1.3 }
    }
}

/// Via-point alternates generated when the provider returns few routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticAlternates {
    pub enabled: bool,
    /// Perpendicular offset of the via point from the trip midpoint.
    pub offset_m: f64,
}

impl Default for SyntheticAlternates {
    fn default() -> Self {
        Self {
            enabled: false,
            offset_m: 600.0,
        }
    }
}

/// Configuration parameters for drop-off discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Walk radius used when a request does not give one.
    pub walk_radius_m: f64,
    /// Candidates closer than this to the destination are not worth suggesting.
    pub min_separation_m: f64,
    /// Speed for straight-line walk estimates and the walk-time ceiling.
    pub walking_speed_mps: f64,
    /// Tolerance added to the walk-time ceiling.
    pub walk_slack_min: f64,
    /// Decimal places for duplicate detection.
    pub dedup_decimals: u32,
    /// Concurrent point probes in flight per request.
    pub max_concurrent_probes: usize,

    pub sampling: SamplingConfig,
    pub caps: CapsConfig,
    pub strict: TierFactors,
    pub relaxed: TierFactors,
    pub price_gate: PriceGate,
    pub tie_break: TieBreak,
    pub surge: SurgeConfig,
    pub synthetic_alternates: SyntheticAlternates,

    pub ratecard: Ratecard,
    pub bands: BandPolicy,
    pub time_of_day: TimeOfDayPolicy,
    pub geofences: Vec<GeoFence>,
}

impl DiscoveryConfig {
    /// Walk-time ceiling in minutes for a given radius, including slack.
    pub fn walk_ceiling_min(&self, walk_radius_m: f64) -> f64 {
        walk_radius_m / self.walking_speed_mps / 60.0 + self.walk_slack_min
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), DiscoveryError> {
        let invalid = |msg: &str| Err(DiscoveryError::InvalidConfig(msg.to_string()));

        let positive = |v: f64| v.is_finite() && v > 0.0;
        let non_negative = |v: f64| v.is_finite() && v >= 0.0;

        if !positive(self.walk_radius_m) {
            return invalid("walk_radius_m must be positive");
        }
        if !non_negative(self.min_separation_m) {
            return invalid("min_separation_m must be non-negative");
        }
        if !positive(self.walking_speed_mps) {
            return invalid("walking_speed_mps must be positive");
        }
        if !non_negative(self.walk_slack_min) {
            return invalid("walk_slack_min must be non-negative");
        }
        if self.dedup_decimals > 9 {
            return invalid("dedup_decimals must be at most 9");
        }
        if self.max_concurrent_probes == 0 {
            return invalid("max_concurrent_probes must be at least 1");
        }
        if self.sampling.count == 0 {
            return invalid("sampling.count must be at least 1");
        }
        if !(self.sampling.tail_fraction > 0.0 && self.sampling.tail_fraction <= 1.0) {
            return invalid("sampling.tail_fraction must be within (0, 1]");
        }
        if self.caps.regular_routes == 0 {
            return invalid("caps.regular_routes must be at least 1");
        }
        if self.caps.per_route == 0 || self.caps.max_suggestions == 0 {
            return invalid("caps.per_route and caps.max_suggestions must be at least 1");
        }
        if self.caps.min_suggestions > self.caps.max_suggestions {
            return invalid("caps.min_suggestions must not exceed caps.max_suggestions");
        }
        for (name, tier) in [("strict", &self.strict), ("relaxed", &self.relaxed)] {
            if !positive(tier.distance_factor) || !positive(tier.time_factor) {
                return Err(DiscoveryError::InvalidConfig(format!(
                    "{name} factors must be positive"
                )));
            }
        }
        if !non_negative(self.price_gate.min_savings_usd)
            || !non_negative(self.price_gate.min_savings_pct)
        {
            return invalid("price_gate thresholds must be non-negative");
        }
        if !non_negative(self.tie_break.per_km) || !non_negative(self.tie_break.per_minute) {
            return invalid("tie_break weights must be non-negative");
        }
        if !positive(self.surge.min) || !(self.surge.max >= self.surge.min) {
            return invalid("surge range must satisfy 0 < min <= max");
        }
        if self.synthetic_alternates.enabled && !positive(self.synthetic_alternates.offset_m) {
            return invalid("synthetic_alternates.offset_m must be positive");
        }
        let rc = &self.ratecard;
        if let Some((name, _)) = [
            ("base_fee", rc.base_fee),
            ("per_mile", rc.per_mile),
            ("per_minute", rc.per_minute),
            ("service_fee", rc.service_fee),
            ("minimum_fare", rc.minimum_fare),
        ]
        .into_iter()
        .find(|(_, v)| !non_negative(*v))
        {
            return Err(DiscoveryError::InvalidConfig(format!(
                "ratecard.{name} must be non-negative"
            )));
        }
        let bands = &self.bands;
        if [bands.low, bands.elevated_low]
            .iter()
            .any(|b| !(0.0..1.0).contains(b))
            || [bands.high, bands.elevated_high]
                .iter()
                .any(|b| !non_negative(*b))
        {
            return invalid("band widths must be within [0, 1) below and >= 0 above");
        }
        if self.time_of_day.windows.iter().any(|w| {
            w.start_hour > 23 || w.end_hour > 24 || !positive(w.multiplier)
        }) {
            return invalid("time_of_day windows need hours in 0..=24 and positive multipliers");
        }
        if let Some(fence) = self
            .geofences
            .iter()
            .find(|f| !f.bounds.is_valid() || !f.penalty_usd.is_finite())
        {
            return Err(DiscoveryError::InvalidConfig(format!(
                "geofence '{}' has invalid bounds or penalty",
                fence.name
            )));
        }
        Ok(())
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            walk_radius_m: 800.0,
            min_separation_m: 60.0,
            walking_speed_mps: 1.33,
            walk_slack_min: 1.0,
            dedup_decimals: 6,
            max_concurrent_probes: 8,
            sampling: SamplingConfig::default(),
            caps: CapsConfig::default(),
            strict: TierFactors {
                distance_factor: 0.88,
                time_factor: 0.88,
            },
            relaxed: TierFactors {
                distance_factor: 0.97,
                time_factor: 0.97,
            },
            price_gate: PriceGate::default(),
            tie_break: TieBreak::default(),
            surge: SurgeConfig::default(),
            synthetic_alternates: SyntheticAlternates::default(),
            ratecard: Ratecard::default(),
            bands: BandPolicy::default(),
            time_of_day: TimeOfDayPolicy::default(),
            geofences: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fare::BoundingBox;

    #[test]
    fn default_config() {
        let config = DiscoveryConfig::default();

        assert_eq!(config.walk_radius_m, 800.0);
        assert_eq!(config.sampling.count, 16);
        assert_eq!(config.sampling.tail_fraction, 0.22);
        assert_eq!(config.caps.regular_routes, 2);
        assert_eq!(config.caps.alternate_routes, 3);
        assert_eq!(config.caps.per_route, 2);
        assert_eq!(config.caps.min_suggestions, 2);
        assert_eq!(config.strict.distance_factor, 0.88);
        assert_eq!(config.relaxed.time_factor, 0.97);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn walk_ceiling() {
        let config = DiscoveryConfig::default();
        // 798 m at 1.33 m/s is 10 minutes, plus 1 minute slack
        assert!((config.walk_ceiling_min(798.0) - 11.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = DiscoveryConfig::default();
        config.sampling.tail_fraction = 0.0;
        assert!(config.validate().is_err());

        let mut config = DiscoveryConfig::default();
        config.caps.min_suggestions = 10;
        assert!(config.validate().is_err());

        let mut config = DiscoveryConfig::default();
        config.strict.distance_factor = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = DiscoveryConfig::default();
        config.surge = SurgeConfig { min: 1.3, max: 1.0 };
        assert!(config.validate().is_err());

        let mut config = DiscoveryConfig::default();
        config.max_concurrent_probes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_ratecard() {
        for field in ["base_fee", "per_mile", "per_minute", "service_fee", "minimum_fare"] {
            let mut config = DiscoveryConfig::default();
            let rc = &mut config.ratecard;
            let value = match field {
                "base_fee" => &mut rc.base_fee,
                "per_mile" => &mut rc.per_mile,
                "per_minute" => &mut rc.per_minute,
                "service_fee" => &mut rc.service_fee,
                _ => &mut rc.minimum_fare,
            };

            *value = -1.0;
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains(field), "{field}: {err}");
        }

        let mut config = DiscoveryConfig::default();
        config.ratecard.per_mile = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_geofence() {
        let mut config = DiscoveryConfig::default();
        config.geofences.push(GeoFence {
            name: "flipped".into(),
            bounds: BoundingBox {
                min_lat: 1.0,
                min_lng: 0.0,
                max_lat: 0.0,
                max_lng: 1.0,
            },
            penalty_usd: 2.0,
        });

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("flipped"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: DiscoveryConfig = toml::from_str(
            r#"
walk_radius_m = 600.0

[caps]
max_suggestions = 3

[strict]
distance_factor = 0.85
time_factor = 0.9
"#,
        )
        .unwrap();

        assert_eq!(config.walk_radius_m, 600.0);
        assert_eq!(config.caps.max_suggestions, 3);
        assert_eq!(config.caps.per_route, 2);
        assert_eq!(config.strict.distance_factor, 0.85);
        assert_eq!(config.relaxed.distance_factor, 0.97);
        assert_eq!(config.ratecard.minimum_fare, 5.0);
    }
}
