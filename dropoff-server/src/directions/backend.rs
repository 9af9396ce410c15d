//! Runtime choice between the live and offline providers.

use crate::domain::GeoPoint;

use super::client::MapboxClient;
use super::error::DirectionsError;
use super::provider::{DirectionsProvider, Geocoder, PlaceSuggestion, Profile, ProviderRoute};
use super::synthetic::SyntheticDirections;

/// Provider selected at start-up.
#[derive(Debug, Clone)]
pub enum Backend {
    Mapbox(MapboxClient),
    Synthetic(SyntheticDirections),
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Mapbox(_) => "mapbox",
            Backend::Synthetic(_) => "synthetic",
        }
    }
}

impl DirectionsProvider for Backend {
    async fn route(
        &self,
        points: &[GeoPoint],
        profile: Profile,
        alternatives: bool,
    ) -> Result<Vec<ProviderRoute>, DirectionsError> {
        match self {
            Backend::Mapbox(client) => client.route(points, profile, alternatives).await,
            Backend::Synthetic(synthetic) => synthetic.route(points, profile, alternatives).await,
        }
    }
}

impl Geocoder for Backend {
    async fn describe(&self, point: &GeoPoint) -> Result<String, DirectionsError> {
        match self {
            Backend::Mapbox(client) => client.describe(point).await,
            Backend::Synthetic(synthetic) => synthetic.describe(point).await,
        }
    }

    async fn suggest(
        &self,
        query: &str,
        proximity: Option<&GeoPoint>,
    ) -> Result<Vec<PlaceSuggestion>, DirectionsError> {
        match self {
            Backend::Mapbox(client) => client.suggest(query, proximity).await,
            Backend::Synthetic(synthetic) => synthetic.suggest(query, proximity).await,
        }
    }
}
