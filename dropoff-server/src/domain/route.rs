//! Driving routes between a pickup and a destination.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{DomainError, GeoPoint};

/// Role of a route within a route set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteClass {
    /// Baseline route used for fare comparison.
    Regular,
    /// Map-only route; still a source of drop-off samples.
    Alternate,
}

impl fmt::Display for RouteClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteClass::Regular => f.write_str("regular"),
            RouteClass::Alternate => f.write_str("alternate"),
        }
    }
}

/// A driving route with its geometry.
///
/// Routes are immutable once built. When the pickup or destination changes
/// a new route set is fetched rather than editing an existing one.
#[derive(Debug, Clone, Serialize)]
pub struct Route {
    pub distance_m: f64,
    pub duration_s: f64,
    geometry: Vec<GeoPoint>,
    pub label: String,
    pub class: RouteClass,
}

impl Route {
    /// Build a route, rejecting empty geometry or non-finite stats.
    pub fn new(
        distance_m: f64,
        duration_s: f64,
        geometry: Vec<GeoPoint>,
        label: impl Into<String>,
        class: RouteClass,
    ) -> Result<Self, DomainError> {
        if geometry.is_empty() {
            return Err(DomainError::EmptyGeometry);
        }
        if !distance_m.is_finite() || distance_m < 0.0 {
            return Err(DomainError::InvalidRouteStats("distance"));
        }
        if !duration_s.is_finite() || duration_s < 0.0 {
            return Err(DomainError::InvalidRouteStats("duration"));
        }

        Ok(Self {
            distance_m,
            duration_s,
            geometry,
            label: label.into(),
            class,
        })
    }

    /// The ordered route geometry. Never empty.
    pub fn geometry(&self) -> &[GeoPoint] {
        &self.geometry
    }

    /// Final point of the route (the destination, within provider precision).
    pub fn end(&self) -> GeoPoint {
        // Non-empty by construction
        self.geometry[self.geometry.len() - 1]
    }

    pub fn is_regular(&self) -> bool {
        self.class == RouteClass::Regular
    }
}
