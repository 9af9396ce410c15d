//! Relaxation pipeline.
//!
//! Runs Strict, then Relaxed, then Fallback over the tail samples of every
//! visible route until enough suggestions are accumulated:
//! 1. Build the route set and fare baseline
//! 2. Sample each visible route's tail and probe every unique point once
//! 3. Classify the probed points tier by tier, merging each tier's capped
//!    output into what earlier tiers accepted
//! 4. Rank, deduplicate and truncate the merged list

use std::collections::{HashMap, HashSet};

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::directions::{DirectionsProvider, Geocoder};
use crate::domain::{CoordKey, GeoPoint, Route};
use crate::fare::FareQuote;

use super::candidate::{Candidate, Tier};
use super::config::DiscoveryConfig;
use super::error::DiscoveryError;
use super::evaluate::{Baseline, TripContext, classify, probe};
use super::fanout::bounded_map;
use super::generation::GenerationToken;
use super::rank::{finalize, finalize_tier};
use super::route_set::{RouteSummary, baseline_fare, build_route_set, summarize};
use super::sample::sample_tail;

/// Which routes of the route set are sampled for drop-offs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibleRoutes {
    #[default]
    All,
    RegularOnly,
    /// Only routes with these labels.
    Only(Vec<String>),
}

impl VisibleRoutes {
    pub fn includes(&self, route: &Route) -> bool {
        match self {
            VisibleRoutes::All => true,
            VisibleRoutes::RegularOnly => route.is_regular(),
            VisibleRoutes::Only(labels) => labels.iter().any(|l| *l == route.label),
        }
    }
}

/// A single discovery request.
#[derive(Debug, Clone)]
pub struct DiscoveryRequest {
    pub pickup: GeoPoint,
    pub destination: GeoPoint,
    pub walk_radius_m: f64,
    pub visible_routes: VisibleRoutes,
    /// Local hour for the time-of-day multiplier. `None` applies none.
    pub hour: Option<u32>,
}

impl DiscoveryRequest {
    pub fn new(pickup: GeoPoint, destination: GeoPoint, walk_radius_m: f64) -> Self {
        Self {
            pickup,
            destination,
            walk_radius_m,
            visible_routes: VisibleRoutes::All,
            hour: None,
        }
    }

    pub fn with_visible_routes(mut self, visible_routes: VisibleRoutes) -> Self {
        self.visible_routes = visible_routes;
        self
    }

    pub fn at_hour(mut self, hour: u32) -> Self {
        self.hour = Some(hour);
        self
    }

    /// Validate the request. Runs before any provider call.
    pub fn validate(&self) -> Result<(), DiscoveryError> {
        let invalid = |msg: String| DiscoveryError::InvalidRequest(msg);

        self.pickup
            .validate()
            .map_err(|e| invalid(format!("pickup: {e}")))?;
        self.destination
            .validate()
            .map_err(|e| invalid(format!("destination: {e}")))?;

        if !self.walk_radius_m.is_finite() || self.walk_radius_m <= 0.0 {
            return Err(invalid("walk radius must be a positive number of meters".into()));
        }
        if let Some(hour) = self.hour.filter(|h| *h > 23) {
            return Err(invalid(format!("hour {hour} is outside 0..=23")));
        }
        if matches!(&self.visible_routes, VisibleRoutes::Only(labels) if labels.is_empty()) {
            return Err(invalid("visible route list is empty".into()));
        }
        Ok(())
    }
}

/// Result of a discovery request.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryResult {
    /// Every route of the route set with its fare.
    pub routes: Vec<RouteSummary>,
    /// Surge applied to every quote (proxy times time-of-day multiplier).
    pub surge: f64,
    /// Cheapest Regular fare. `None` when there is no route.
    pub baseline: Option<FareQuote>,
    /// Ranked suggestions, best first.
    pub suggestions: Vec<Candidate>,
    /// Loosest tier that ran. `None` when no tier ran.
    pub tier_reached: Option<Tier>,
    /// Unique points sent to the provider.
    pub points_probed: usize,
}

impl DiscoveryResult {
    pub fn empty() -> Self {
        Self {
            routes: Vec::new(),
            surge: 1.0,
            baseline: None,
            suggestions: Vec::new(),
            tier_reached: None,
            points_probed: 0,
        }
    }
}

/// Tail samples grouped per route, as indices into a unique point list.
struct Samples<'r> {
    points: Vec<GeoPoint>,
    per_route: Vec<(&'r Route, Vec<usize>)>,
}

fn collect_samples<'r>(
    routes: impl Iterator<Item = &'r Route>,
    config: &DiscoveryConfig,
) -> Samples<'r> {
    let mut points = Vec::new();
    let mut index: HashMap<CoordKey, usize> = HashMap::new();
    let mut per_route = Vec::new();

    for route in routes {
        let sampled = sample_tail(
            route,
            config.sampling.count,
            config.sampling.tail_fraction,
            config.dedup_decimals,
        );
        let indices = sampled
            .into_iter()
            .map(|p| {
                *index
                    .entry(CoordKey::new(&p, config.dedup_decimals))
                    .or_insert_with(|| {
                        points.push(p);
                        points.len() - 1
                    })
            })
            .collect();
        per_route.push((route, indices));
    }

    Samples { points, per_route }
}

/// Drop-off discovery over a provider and configuration.
pub struct Discovery<'a, P: DirectionsProvider> {
    provider: &'a P,
    config: &'a DiscoveryConfig,
}

impl<'a, P: DirectionsProvider> Discovery<'a, P> {
    pub fn new(provider: &'a P, config: &'a DiscoveryConfig) -> Self {
        Self { provider, config }
    }

    /// Run discovery for `request`.
    ///
    /// Provider failures never fail the request; the worst outcome is an
    /// empty suggestion list. Errors are limited to invalid input and
    /// [`DiscoveryError::Superseded`] when `token` goes stale.
    pub async fn discover(
        &self,
        request: &DiscoveryRequest,
        token: &GenerationToken,
    ) -> Result<DiscoveryResult, DiscoveryError> {
        let config = self.config;
        config.validate()?;
        request.validate()?;
        token.ensure_current()?;

        let route_set =
            build_route_set(self.provider, request.pickup, request.destination, config).await;
        token.ensure_current()?;
        if route_set.is_empty() {
            info!("no route between pickup and destination, no suggestions");
            return Ok(DiscoveryResult::empty());
        }

        let time_of_day = request
            .hour
            .map_or(1.0, |h| config.time_of_day.multiplier(h));
        let surge = route_set.surge_proxy * time_of_day;

        let routes = summarize(&route_set, &request.destination, surge, config);
        let Some(baseline_quote) = baseline_fare(&routes) else {
            return Ok(DiscoveryResult::empty());
        };
        let baseline = Baseline {
            fare: baseline_quote,
            surge,
        };

        let samples = collect_samples(
            route_set
                .routes
                .iter()
                .filter(|r| request.visible_routes.includes(r)),
            config,
        );

        let trip = TripContext {
            pickup: request.pickup,
            destination: request.destination,
            walk_radius_m: request.walk_radius_m,
        };
        let provider = self.provider;
        let probes = bounded_map(
            samples.points.clone(),
            config.max_concurrent_probes,
            token,
            |point| {
                let trip = &trip;
                async move { probe(provider, point, trip, config).await }
            },
        )
        .await?;

        let usable = probes.iter().filter(|p| p.is_ok()).count();
        debug!(
            routes = samples.per_route.len(),
            probed = probes.len(),
            usable,
            "points probed"
        );

        let caps = &config.caps;
        let mut accumulated: Vec<Candidate> = Vec::new();
        let mut accepted_keys: HashSet<CoordKey> = HashSet::new();
        let mut tier_reached = None;

        for tier in Tier::ALL {
            token.ensure_current()?;
            tier_reached = Some(tier);

            let mut accepted = Vec::new();
            for (route, indices) in &samples.per_route {
                for &i in indices {
                    let Ok(stats) = &probes[i] else { continue };
                    if accepted_keys.contains(&CoordKey::new(&stats.point, config.dedup_decimals)) {
                        continue;
                    }
                    if let Ok(candidate) = classify(stats, route, tier, &baseline, config) {
                        accepted.push(candidate);
                    }
                }
            }

            let mut tier_output =
                finalize_tier(accepted, &config.tie_break, config.dedup_decimals, caps.per_route);
            if tier == Tier::Fallback {
                tier_output.truncate(caps.min_suggestions.saturating_sub(accumulated.len()));
            }

            accepted_keys.extend(tier_output.iter().map(|c| c.key(config.dedup_decimals)));
            accumulated.extend(tier_output);

            debug!(%tier, accumulated = accumulated.len(), "tier complete");

            if accumulated.len() >= caps.min_suggestions {
                break;
            }
        }

        let suggestions = finalize(
            accumulated,
            &config.tie_break,
            config.dedup_decimals,
            caps.max_suggestions,
        );
        token.ensure_current()?;

        info!(
            suggestions = suggestions.len(),
            tier = ?tier_reached,
            surge,
            "discovery complete"
        );

        Ok(DiscoveryResult {
            routes,
            surge,
            baseline: Some(baseline_quote),
            suggestions,
            tier_reached,
            points_probed: probes.len(),
        })
    }
}

/// Run discovery once with a token that is never superseded.
pub async fn discover<P: DirectionsProvider>(
    request: &DiscoveryRequest,
    config: &DiscoveryConfig,
    provider: &P,
) -> Result<DiscoveryResult, DiscoveryError> {
    Discovery::new(provider, config)
        .discover(request, &GenerationToken::detached())
        .await
}

/// Fill candidate labels by reverse geocoding, at most `limit` at a time.
///
/// A failed lookup leaves the label empty.
pub async fn describe_candidates<G: Geocoder>(
    geocoder: &G,
    candidates: &mut [Candidate],
    limit: usize,
) {
    let points: Vec<GeoPoint> = candidates.iter().map(|c| c.drop_point).collect();
    let labels: Vec<String> = stream::iter(points)
        .map(|point| async move {
            match geocoder.describe(&point).await {
                Ok(label) => label,
                Err(e) => {
                    debug!(%point, error = %e, "reverse geocoding failed");
                    String::new()
                }
            }
        })
        .buffered(limit.max(1))
        .collect()
        .await;

    for (candidate, label) in candidates.iter_mut().zip(labels) {
        candidate.label = label;
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
