//! Zones that carry a flat fare surcharge.

use serde::{Deserialize, Serialize};

use crate::domain::GeoPoint;

/// Axis-aligned latitude/longitude box. Edges are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lng: f64,
    pub max_lat: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    pub fn contains(&self, p: &GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&p.lat)
            && (self.min_lng..=self.max_lng).contains(&p.lng)
    }

    /// A box is usable when its bounds are finite and ordered.
    pub fn is_valid(&self) -> bool {
        [self.min_lat, self.min_lng, self.max_lat, self.max_lng]
            .iter()
            .all(|v| v.is_finite())
            && self.min_lat <= self.max_lat
            && self.min_lng <= self.max_lng
    }
}

/// A named zone with a flat surcharge in USD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoFence {
    pub name: String,
    #[serde(flatten)]
    pub bounds: BoundingBox,
    pub penalty_usd: f64,
}

/// Sum of the surcharges of every fence containing `point`.
///
/// Overlapping fences all apply; no match yields zero.
pub fn geofence_penalty(fences: &[GeoFence], point: &GeoPoint) -> f64 {
    fences
        .iter()
        .filter(|f| f.bounds.contains(point))
        .map(|f| f.penalty_usd)
        .sum()
}
