//! Route set construction.
//!
//! Fetches traffic-aware routes with alternatives for a trip, splits them
//! into Regular and Alternate routes, and derives the surge proxy from the
//! traffic/free-flow duration ratio.

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use crate::directions::{DirectionsProvider, Profile, ProviderRoute};
use crate::domain::{GeoPoint, Route, RouteClass, bearing, distance, offset};
use crate::fare::{FareQuote, estimate, geofence_penalty};

use super::config::DiscoveryConfig;

/// Routes for one trip, fastest first, with the surge proxy.
#[derive(Debug, Clone)]
pub struct RouteSet {
    /// Regular routes first, then Alternates; each group by duration.
    pub routes: Vec<Route>,
    /// Clamped traffic/free-flow duration ratio. 1.0 when unknown.
    pub surge_proxy: f64,
}

impl RouteSet {
    pub fn empty() -> Self {
        Self {
            routes: Vec::new(),
            surge_proxy: 1.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn regular(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter().filter(|r| r.is_regular())
    }

    pub fn alternates(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter().filter(|r| !r.is_regular())
    }
}

/// A route with its fare, as shown to the rider.
#[derive(Debug, Clone, Serialize)]
pub struct RouteSummary {
    pub label: String,
    pub class: RouteClass,
    pub distance_m: f64,
    pub duration_s: f64,
    pub fare: FareQuote,
}

fn to_route(raw: ProviderRoute, label: String, class: RouteClass) -> Option<Route> {
    match Route::new(raw.distance_m, raw.duration_s, raw.geometry, label, class) {
        Ok(route) => Some(route),
        Err(e) => {
            debug!(error = %e, "discarding unusable provider route");
            None
        }
    }
}

/// Surge proxy: fastest traffic duration over free-flow duration, clamped.
pub fn surge_proxy(traffic_s: f64, free_flow_s: Option<f64>, config: &DiscoveryConfig) -> f64 {
    let ratio = match free_flow_s {
        Some(free) if free > 0.0 && traffic_s.is_finite() => traffic_s / free,
        _ => 1.0,
    };
    ratio.clamp(config.surge.min, config.surge.max)
}

/// Via points either side of the trip midpoint, perpendicular to the
/// pickup to destination bearing.
pub fn via_points(pickup: &GeoPoint, destination: &GeoPoint, offset_m: f64) -> [GeoPoint; 2] {
    let heading = bearing(pickup, destination);
    let midpoint = offset(pickup, heading, distance(pickup, destination) / 2.0);
    [
        offset(&midpoint, (heading + 90.0) % 360.0, offset_m),
        offset(&midpoint, (heading + 270.0) % 360.0, offset_m),
    ]
}

async fn synthetic_alternates<P: DirectionsProvider>(
    provider: &P,
    pickup: GeoPoint,
    destination: GeoPoint,
    wanted: usize,
    config: &DiscoveryConfig,
) -> Vec<Route> {
    let vias = via_points(&pickup, &destination, config.synthetic_alternates.offset_m);
    let queries = vias.iter().map(|via| {
        let points = [pickup, *via, destination];
        async move { provider.route(&points, Profile::DrivingTraffic, false).await }
    });

    let mut found: Vec<ProviderRoute> = join_all(queries)
        .await
        .into_iter()
        .filter_map(|result| match result {
            Ok(routes) => routes.into_iter().next(),
            Err(e) => {
                debug!(error = %e, "via-point alternate query failed");
                None
            }
        })
        .collect();
    found.sort_by(|a, b| a.duration_s.total_cmp(&b.duration_s));

    found
        .into_iter()
        .take(wanted)
        .enumerate()
        .filter_map(|(i, raw)| to_route(raw, format!("Via {}", i + 1), RouteClass::Alternate))
        .collect()
}

/// Build the route set for a trip.
///
/// A failed or empty alternatives query yields an empty set; the caller
/// treats that as "no suggestions".
pub async fn build_route_set<P: DirectionsProvider>(
    provider: &P,
    pickup: GeoPoint,
    destination: GeoPoint,
    config: &DiscoveryConfig,
) -> RouteSet {
    let points = [pickup, destination];
    let (traffic, free_flow) = tokio::join!(
        provider.route(&points, Profile::DrivingTraffic, true),
        provider.route(&points, Profile::Driving, false),
    );

    let mut raw = match traffic {
        Ok(routes) if !routes.is_empty() => routes,
        Ok(_) => {
            debug!("provider found no route between pickup and destination");
            return RouteSet::empty();
        }
        Err(e) => {
            warn!(error = %e, "route query failed");
            return RouteSet::empty();
        }
    };
    raw.sort_by(|a, b| a.duration_s.total_cmp(&b.duration_s));

    let free_flow_s = match free_flow {
        Ok(routes) => routes.first().map(|r| r.duration_s),
        Err(e) => {
            debug!(error = %e, "free-flow query failed, surge proxy defaults to 1.0");
            None
        }
    };
    let surge_proxy = surge_proxy(raw[0].duration_s, free_flow_s, config);

    let caps = &config.caps;
    let mut routes: Vec<Route> = Vec::with_capacity(caps.regular_routes + caps.alternate_routes);
    let mut regular = 0;
    let mut alternate = 0;
    for route in raw {
        if regular < caps.regular_routes {
            if let Some(r) = to_route(route, format!("Route {}", regular + 1), RouteClass::Regular) {
                routes.push(r);
                regular += 1;
            }
        } else if alternate < caps.alternate_routes {
            if let Some(r) = to_route(route, format!("Alt {}", alternate + 1), RouteClass::Alternate)
            {
                routes.push(r);
                alternate += 1;
            }
        } else {
            break;
        }
    }

    if regular == 0 {
        return RouteSet::empty();
    }

    if config.synthetic_alternates.enabled && alternate < caps.alternate_routes {
        let extra = synthetic_alternates(
            provider,
            pickup,
            destination,
            caps.alternate_routes - alternate,
            config,
        )
        .await;
        routes.extend(extra);
    }

    debug!(
        regular,
        alternates = routes.len() - regular,
        surge_proxy,
        "route set built"
    );

    RouteSet {
        routes,
        surge_proxy,
    }
}

/// Fare every route at `surge`, with the destination's geofence penalty.
pub fn summarize(
    route_set: &RouteSet,
    destination: &GeoPoint,
    surge: f64,
    config: &DiscoveryConfig,
) -> Vec<RouteSummary> {
    let penalty = geofence_penalty(&config.geofences, destination);
    route_set
        .routes
        .iter()
        .map(|route| RouteSummary {
            label: route.label.clone(),
            class: route.class,
            distance_m: route.distance_m,
            duration_s: route.duration_s,
            fare: estimate(
                &config.ratecard,
                &config.bands,
                route.distance_m,
                route.duration_s,
                surge,
                penalty,
            ),
        })
        .collect()
}

/// Cheapest Regular fare, the baseline for savings.
pub fn baseline_fare(summaries: &[RouteSummary]) -> Option<FareQuote> {
    summaries
        .iter()
        .filter(|s| s.class == RouteClass::Regular)
        .map(|s| s.fare)
        .min_by(|a, b| a.center.total_cmp(&b.center))
}
