//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::discovery::{DiscoveryConfig, DiscoveryRequest, DiscoveryResult, VisibleRoutes};
use crate::domain::GeoPoint;

/// Request to discover drop-off points.
#[derive(Debug, Deserialize)]
pub struct DiscoverRequest {
    /// Client session; a newer request for the same session supersedes
    /// this one
    pub session: Option<String>,

    pub pickup: GeoPoint,

    pub destination: GeoPoint,

    /// Walk radius in meters (defaults to the configured radius)
    pub walk_radius_m: Option<f64>,

    /// Routes to sample (defaults to all)
    #[serde(default)]
    pub visible_routes: VisibleRoutes,

    /// Local hour for time-of-day pricing (defaults to now)
    pub hour: Option<u32>,
}

impl DiscoverRequest {
    /// Convert to a discovery request, filling defaults.
    pub fn to_request(&self, config: &DiscoveryConfig, current_hour: u32) -> DiscoveryRequest {
        DiscoveryRequest::new(
            self.pickup,
            self.destination,
            self.walk_radius_m.unwrap_or(config.walk_radius_m),
        )
        .with_visible_routes(self.visible_routes.clone())
        .at_hour(self.hour.unwrap_or(current_hour))
    }
}

/// Discovery response.
#[derive(Debug, Serialize)]
pub struct DiscoverResponse {
    /// Generation of this request within its session
    pub generation: Option<u64>,

    #[serde(flatten)]
    pub result: DiscoveryResult,
}

/// Query for place suggestions.
#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    /// Partial place name or address
    pub q: String,

    /// Optional bias point
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Query for a point's label.
#[derive(Debug, Deserialize)]
pub struct DescribeQuery {
    pub lat: f64,
    pub lng: f64,
}

/// A point's label.
#[derive(Debug, Serialize)]
pub struct DescribeResponse {
    pub label: String,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discover_request_defaults() {
        let req: DiscoverRequest = serde_json::from_str(
            r#"{
                "pickup": {"lat": 40.70, "lng": -74.00},
                "destination": {"lat": 40.75, "lng": -74.00}
            }"#,
        )
        .unwrap();
        let config = DiscoveryConfig::default();

        let request = req.to_request(&config, 8);
        assert_eq!(request.walk_radius_m, 800.0);
        assert_eq!(request.visible_routes, VisibleRoutes::All);
        assert_eq!(request.hour, Some(8));
        assert!(req.session.is_none());
    }

    #[test]
    fn discover_request_overrides() {
        let req: DiscoverRequest = serde_json::from_str(
            r#"{
                "session": "abc",
                "pickup": {"lat": 40.70, "lng": -74.00},
                "destination": {"lat": 40.75, "lng": -74.00},
                "walk_radius_m": 500,
                "visible_routes": {"only": ["Route 1"]},
                "hour": 17
            }"#,
        )
        .unwrap();
        let config = DiscoveryConfig::default();

        let request = req.to_request(&config, 8);
        assert_eq!(request.walk_radius_m, 500.0);
        assert_eq!(
            request.visible_routes,
            VisibleRoutes::Only(vec!["Route 1".into()])
        );
        assert_eq!(request.hour, Some(17));
    }

    #[test]
    fn visible_routes_unit_variants() {
        let v: VisibleRoutes = serde_json::from_str(r#""regular_only""#).unwrap();
        assert_eq!(v, VisibleRoutes::RegularOnly);
    }
}
