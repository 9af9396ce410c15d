//! Provider abstractions for routing and geocoding.
//!
//! The discovery engine only depends on these traits, so it can run against
//! the live HTTP client, the offline synthetic provider, or test mocks.

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::domain::GeoPoint;

use super::error::DirectionsError;

/// Travel mode for a directions query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Profile {
    /// Free-flow driving (no live traffic).
    Driving,
    /// Traffic-aware driving.
    DrivingTraffic,
    Walking,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Driving => "driving",
            Profile::DrivingTraffic => "driving-traffic",
            Profile::Walking => "walking",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One route as returned by a directions provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRoute {
    pub distance_m: f64,
    pub duration_s: f64,
    pub geometry: Vec<GeoPoint>,
}

/// A place returned by search-as-you-type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceSuggestion {
    pub label: String,
    pub point: GeoPoint,
}

/// Source of routes between ordered waypoints.
pub trait DirectionsProvider: Send + Sync {
    /// Route through `points` in order.
    ///
    /// `Ok` with an empty list means the provider answered but found no
    /// route. `Err` means the provider could not be reached or answered
    /// with something unusable.
    fn route(
        &self,
        points: &[GeoPoint],
        profile: Profile,
        alternatives: bool,
    ) -> impl Future<Output = Result<Vec<ProviderRoute>, DirectionsError>> + Send;
}

/// Reverse geocoding and place search.
pub trait Geocoder: Send + Sync {
    /// Short human-readable label for a point. May be empty.
    fn describe(
        &self,
        point: &GeoPoint,
    ) -> impl Future<Output = Result<String, DirectionsError>> + Send;

    /// Places matching a partial query, optionally biased towards `proximity`.
    fn suggest(
        &self,
        query: &str,
        proximity: Option<&GeoPoint>,
    ) -> impl Future<Output = Result<Vec<PlaceSuggestion>, DirectionsError>> + Send;
}
