//! Mapbox API response DTOs.
//!
//! These types map directly to the Directions v5 and Geocoding v5 JSON
//! responses. Coordinates on the wire are `[lng, lat]`.

use serde::Deserialize;

use crate::domain::{GeoPoint, InvalidPoint};

use super::provider::{PlaceSuggestion, ProviderRoute};

/// Response from `/directions/v5/mapbox/{profile}/{coordinates}`.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsResponse {
    /// "Ok", "NoRoute", "NoSegment", "InvalidInput", ...
    pub code: String,

    /// Present on errors.
    pub message: Option<String>,

    #[serde(default)]
    pub routes: Vec<RouteDto>,
}

impl DirectionsResponse {
    /// Whether the code means "answered, but nothing routable".
    pub fn is_no_route(&self) -> bool {
        matches!(self.code.as_str(), "NoRoute" | "NoSegment")
    }
}

/// A route in a directions response.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteDto {
    /// Meters.
    pub distance: f64,

    /// Seconds.
    pub duration: f64,

    /// Requested with `geometries=geojson`.
    pub geometry: LineStringDto,
}

/// GeoJSON LineString.
#[derive(Debug, Clone, Deserialize)]
pub struct LineStringDto {
    pub coordinates: Vec<[f64; 2]>,
}

impl RouteDto {
    pub fn into_route(self) -> Result<ProviderRoute, InvalidPoint> {
        let geometry = self
            .geometry
            .coordinates
            .iter()
            .map(|[lng, lat]| GeoPoint::new(*lat, *lng))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ProviderRoute {
            distance_m: self.distance,
            duration_s: self.duration,
            geometry,
        })
    }
}

/// Response from `/geocoding/v5/mapbox.places/{query}.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingResponse {
    #[serde(default)]
    pub features: Vec<FeatureDto>,
}

/// A place feature in a geocoding response.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureDto {
    /// Full label, e.g. "350 5th Ave, New York, New York 10118, United States".
    pub place_name: String,

    /// Short name, e.g. "350 5th Ave".
    pub text: Option<String>,

    /// `[lng, lat]`.
    pub center: [f64; 2],
}

impl FeatureDto {
    /// Short label for display, preferring `text`.
    pub fn short_label(&self) -> &str {
        self.text
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.place_name)
    }

    pub fn into_suggestion(self) -> Result<PlaceSuggestion, InvalidPoint> {
        let [lng, lat] = self.center;
        Ok(PlaceSuggestion {
            point: GeoPoint::new(lat, lng)?,
            label: self.place_name,
        })
    }
}
