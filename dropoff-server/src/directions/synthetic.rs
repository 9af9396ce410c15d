//! Offline directions provider for development and testing.
//!
//! Produces straight-line routes between waypoints with fixed speeds. Useful
//! when no Mapbox token is configured; results are deterministic.

use crate::domain::{GeoPoint, distance};

use super::error::DirectionsError;
use super::provider::{DirectionsProvider, Geocoder, PlaceSuggestion, Profile, ProviderRoute};

/// Straight-line provider with fixed travel speeds.
#[derive(Debug, Clone)]
pub struct SyntheticDirections {
    /// Free-flow driving speed in m/s.
    pub driving_speed_mps: f64,
    /// Multiplier applied to driving durations under `DrivingTraffic`.
    pub traffic_factor: f64,
    /// Walking speed in m/s.
    pub walking_speed_mps: f64,
    /// Road distance as a multiple of great-circle distance.
    pub detour_factor: f64,
    /// Target spacing between geometry points in meters.
    pub spacing_m: f64,
}

impl Default for SyntheticDirections {
    fn default() -> Self {
        Self {
            driving_speed_mps: 11.0,
            traffic_factor: 1.2,
            walking_speed_mps: 1.33,
            detour_factor: 1.25,
            spacing_m: 40.0,
        }
    }
}

impl SyntheticDirections {
    /// Build the route synchronously; the trait impl wraps this.
    pub fn route_now(&self, points: &[GeoPoint], profile: Profile) -> Vec<ProviderRoute> {
        if points.len() < 2 {
            return Vec::new();
        }

        let mut geometry = vec![points[0]];
        let mut straight = 0.0;

        for pair in points.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let leg = distance(a, b);
            straight += leg;

            let steps = ((leg / self.spacing_m).ceil() as usize).max(1);
            for i in 1..=steps {
                let t = i as f64 / steps as f64;
                geometry.push(GeoPoint {
                    lat: a.lat + (b.lat - a.lat) * t,
                    lng: a.lng + (b.lng - a.lng) * t,
                });
            }
        }

        let (distance_m, duration_s) = match profile {
            Profile::Walking => (straight, straight / self.walking_speed_mps),
            Profile::Driving => {
                let d = straight * self.detour_factor;
                (d, d / self.driving_speed_mps)
            }
            Profile::DrivingTraffic => {
                let d = straight * self.detour_factor;
                (d, d / self.driving_speed_mps * self.traffic_factor)
            }
        };

        vec![ProviderRoute {
            distance_m,
            duration_s,
            geometry,
        }]
    }
}

impl DirectionsProvider for SyntheticDirections {
    async fn route(
        &self,
        points: &[GeoPoint],
        profile: Profile,
        _alternatives: bool,
    ) -> Result<Vec<ProviderRoute>, DirectionsError> {
        Ok(self.route_now(points, profile))
    }
}

impl Geocoder for SyntheticDirections {
    async fn describe(&self, point: &GeoPoint) -> Result<String, DirectionsError> {
        Ok(format!("{:.5}, {:.5}", point.lat, point.lng))
    }

    async fn suggest(
        &self,
        _query: &str,
        _proximity: Option<&GeoPoint>,
    ) -> Result<Vec<PlaceSuggestion>, DirectionsError> {
        Ok(Vec::new())
    }
}
