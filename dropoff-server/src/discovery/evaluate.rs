//! Candidate evaluation.
//!
//! Evaluation is split in two:
//! - [`probe`] makes the provider calls for one point (walk, then drive)
//!   and applies the tier-independent checks
//! - [`classify`] applies a tier's drive and price rules to probed stats
//!
//! `classify` is pure, so re-running a looser tier costs no provider calls.

use std::fmt;

use tracing::{debug, trace};

use crate::directions::{DirectionsProvider, Profile};
use crate::domain::{GeoPoint, Route, distance};
use crate::fare::{FareQuote, estimate, geofence_penalty};

use super::candidate::{Candidate, DriveStats, Tier, WalkStats};
use super::config::{DiscoveryConfig, TierFactors};

/// Why a point was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Radial distance not within `(min_separation, walk_radius]`.
    OutsideRadius,
    /// Walking provider answered with no route.
    NoWalkRoute,
    /// Walk time above the radius-derived ceiling plus slack.
    WalkTooLong,
    /// Driving provider failed or found no route.
    NoDrive,
    /// Drive distance or duration above the tier's factor of the route.
    DriveTooLong,
    /// Saving below the Strict price gate.
    InsufficientSavings,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rejection::OutsideRadius => "outside walk radius",
            Rejection::NoWalkRoute => "no walking route",
            Rejection::WalkTooLong => "walk too long",
            Rejection::NoDrive => "no driving route",
            Rejection::DriveTooLong => "drive too long",
            Rejection::InsufficientSavings => "insufficient savings",
        };
        f.write_str(s)
    }
}

/// Trip context shared by every point of one request.
#[derive(Debug, Clone, Copy)]
pub struct TripContext {
    pub pickup: GeoPoint,
    pub destination: GeoPoint,
    pub walk_radius_m: f64,
}

/// Provider-derived stats for one point that passed the tier-independent
/// checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointStats {
    pub point: GeoPoint,
    pub radial_m: f64,
    pub walk: WalkStats,
    pub drive: DriveStats,
}

/// Fare baseline of a request: cheapest Regular route and the surge used
/// for every quote in the request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    pub fare: FareQuote,
    pub surge: f64,
}

/// Whether `radial_m` lies in `(min_separation, walk_radius]`.
pub fn within_walk_band(radial_m: f64, walk_radius_m: f64, config: &DiscoveryConfig) -> bool {
    radial_m > config.min_separation_m && radial_m <= walk_radius_m
}

/// Walk stats for `point`, falling back to a straight-line estimate when
/// the provider fails.
async fn walk_stats<P: DirectionsProvider>(
    provider: &P,
    point: &GeoPoint,
    trip: &TripContext,
    radial_m: f64,
    config: &DiscoveryConfig,
) -> Result<WalkStats, Rejection> {
    match provider
        .route(&[*point, trip.destination], Profile::Walking, false)
        .await
    {
        Ok(routes) => routes
            .first()
            .map(|r| WalkStats {
                distance_m: r.distance_m,
                duration_s: r.duration_s,
                estimated: false,
            })
            .ok_or(Rejection::NoWalkRoute),
        Err(e) => {
            debug!(%point, error = %e, "walking query failed, using straight-line estimate");
            Ok(WalkStats {
                distance_m: radial_m,
                duration_s: radial_m / config.walking_speed_mps,
                estimated: true,
            })
        }
    }
}

/// Run the provider calls for one point and the tier-independent checks
/// (radius band, walk ceiling, drivable).
pub async fn probe<P: DirectionsProvider>(
    provider: &P,
    point: GeoPoint,
    trip: &TripContext,
    config: &DiscoveryConfig,
) -> Result<PointStats, Rejection> {
    let radial_m = distance(&point, &trip.destination);
    if !within_walk_band(radial_m, trip.walk_radius_m, config) {
        return Err(Rejection::OutsideRadius);
    }

    let walk = walk_stats(provider, &point, trip, radial_m, config).await?;
    if walk.minutes() > config.walk_ceiling_min(trip.walk_radius_m) {
        return Err(Rejection::WalkTooLong);
    }

    // Driving has no straight-line fallback.
    let drive = match provider
        .route(&[trip.pickup, point], Profile::DrivingTraffic, false)
        .await
    {
        Ok(routes) => routes.first().map(|r| DriveStats {
            distance_m: r.distance_m,
            duration_s: r.duration_s,
        }),
        Err(e) => {
            debug!(%point, error = %e, "driving query failed, dropping point");
            None
        }
    }
    .ok_or(Rejection::NoDrive)?;

    Ok(PointStats {
        point,
        radial_m,
        walk,
        drive,
    })
}

fn within_factors(drive: &DriveStats, route: &Route, factors: &TierFactors) -> bool {
    drive.distance_m <= factors.distance_factor * route.distance_m
        && drive.duration_s <= factors.time_factor * route.duration_s
}

/// Apply `tier`'s rules to probed stats for a point sampled from `route`.
pub fn classify(
    stats: &PointStats,
    route: &Route,
    tier: Tier,
    baseline: &Baseline,
    config: &DiscoveryConfig,
) -> Result<Candidate, Rejection> {
    let penalty = geofence_penalty(&config.geofences, &stats.point);
    let fare = estimate(
        &config.ratecard,
        &config.bands,
        stats.drive.distance_m,
        stats.drive.duration_s,
        baseline.surge,
        penalty,
    );
    let savings_usd = (baseline.fare.center - fare.center).max(0.0);

    match tier {
        Tier::Strict => {
            if !within_factors(&stats.drive, route, &config.strict) {
                return Err(Rejection::DriveTooLong);
            }
            let gate = &config.price_gate;
            let pct = if baseline.fare.center > 0.0 {
                savings_usd / baseline.fare.center
            } else {
                0.0
            };
            if savings_usd < gate.min_savings_usd || pct < gate.min_savings_pct {
                return Err(Rejection::InsufficientSavings);
            }
        }
        Tier::Relaxed => {
            if !within_factors(&stats.drive, route, &config.relaxed) {
                return Err(Rejection::DriveTooLong);
            }
        }
        Tier::Fallback => {}
    }

    trace!(point = %stats.point, %tier, savings_usd, "point accepted");

    Ok(Candidate {
        drop_point: stats.point,
        radial_m: stats.radial_m,
        walk: stats.walk,
        drive: stats.drive,
        fare,
        savings_usd,
        source_route: route.label.clone(),
        tier,
        label: String::new(),
    })
}

/// Evaluate one point against one tier: [`probe`] then [`classify`].
pub async fn evaluate<P: DirectionsProvider>(
    provider: &P,
    point: GeoPoint,
    route: &Route,
    tier: Tier,
    trip: &TripContext,
    baseline: &Baseline,
    config: &DiscoveryConfig,
) -> Result<Candidate, Rejection> {
    let stats = probe(provider, point, trip, config).await?;
    classify(&stats, route, tier, baseline, config)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::RouteClass;
    use proptest::prelude::*;

    fn route() -> Route {
        let a = GeoPoint::new(40.70, -74.00).unwrap();
        let b = GeoPoint::new(40.75, -74.00).unwrap();
        Route::new(6_000.0, 1_200.0, vec![a, b], "Route 1", RouteClass::Regular).unwrap()
    }

    fn point_stats() -> impl Strategy<Value = PointStats> {
        (1_000.0f64..8_000.0, 200.0f64..1_600.0).prop_map(|(d, t)| PointStats {
            point: GeoPoint::new(40.746, -74.00).unwrap(),
            radial_m: 445.0,
            walk: WalkStats {
                distance_m: 450.0,
                duration_s: 340.0,
                estimated: false,
            },
            drive: DriveStats {
                distance_m: d,
                duration_s: t,
            },
        })
    }

    proptest! {
        /// Tightening any Strict threshold never admits more points.
        #[test]
        fn strict_is_monotone(
            points in prop::collection::vec(point_stats(), 0..30),
            dist_cut in 0.0f64..0.3,
            time_cut in 0.0f64..0.3,
            usd_raise in 0.0f64..5.0,
            pct_raise in 0.0f64..0.2,
        ) {
            let loose = DiscoveryConfig::default();
            let mut tight = loose.clone();
            tight.strict.distance_factor -= dist_cut;
            tight.strict.time_factor -= time_cut;
            tight.price_gate.min_savings_usd += usd_raise;
            tight.price_gate.min_savings_pct += pct_raise;

            let route = route();
            let baseline = Baseline {
                fare: estimate(&loose.ratecard, &loose.bands, 6_000.0, 1_200.0, 1.0, 0.0),
                surge: 1.0,
            };

            let count = |config: &DiscoveryConfig| {
                points
                    .iter()
                    .filter(|s| classify(s, &route, Tier::Strict, &baseline, config).is_ok())
                    .count()
            };

            prop_assert!(count(&tight) <= count(&loose));
        }

        /// Every tier admits a superset of the tier before it.
        #[test]
        fn tiers_are_nested(s in point_stats()) {
            let config = DiscoveryConfig::default();
            let route = route();
            let baseline = Baseline {
                fare: estimate(&config.ratecard, &config.bands, 6_000.0, 1_200.0, 1.0, 0.0),
                surge: 1.0,
            };

            let strict = classify(&s, &route, Tier::Strict, &baseline, &config).is_ok();
            let relaxed = classify(&s, &route, Tier::Relaxed, &baseline, &config).is_ok();
            let fallback = classify(&s, &route, Tier::Fallback, &baseline, &config).is_ok();

            prop_assert!(!strict || relaxed);
            prop_assert!(!relaxed || fallback);
        }
    }
}
