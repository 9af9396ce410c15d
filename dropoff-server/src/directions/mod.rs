//! Routing and geocoding providers.
//!
//! The discovery engine consumes providers only through the
//! [`DirectionsProvider`] and [`Geocoder`] traits. Two implementations ship
//! with the crate:
//! - [`MapboxClient`]: live Mapbox Directions/Geocoding over HTTP
//! - [`SyntheticDirections`]: offline straight-line routes for development
//!
//! [`Backend`] holds whichever of the two was chosen at start-up.
//!
//! Key characteristics of the provider contract:
//! - "No route found" is `Ok(vec![])`, distinct from a failed call
//! - Coordinates travel as `[lng, lat]` on the wire but are always
//!   [`GeoPoint`](crate::domain::GeoPoint) inside the crate

mod backend;
mod client;
mod error;
mod provider;
mod synthetic;
mod types;

pub use backend::Backend;
pub use client::{DEFAULT_BASE_URL, MapboxClient, MapboxConfig};
pub use error::DirectionsError;
pub use provider::{DirectionsProvider, Geocoder, PlaceSuggestion, Profile, ProviderRoute};
pub use synthetic::SyntheticDirections;
pub use types::{DirectionsResponse, FeatureDto, GeocodingResponse, LineStringDto, RouteDto};
