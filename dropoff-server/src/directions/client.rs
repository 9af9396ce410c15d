//! Mapbox HTTP client.
//!
//! Provides async directions and geocoding queries against the Mapbox REST
//! APIs. Handles authentication, concurrency limiting, and conversion to
//! provider types.

use std::sync::Arc;

use reqwest::Url;
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::GeoPoint;

use super::error::DirectionsError;
use super::provider::{DirectionsProvider, Geocoder, PlaceSuggestion, Profile, ProviderRoute};
use super::types::{DirectionsResponse, GeocodingResponse};

/// Default base URL for the Mapbox APIs.
pub const DEFAULT_BASE_URL: &str = "https://api.mapbox.com";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Maximum number of place suggestions requested per query.
const SUGGEST_LIMIT: u8 = 5;

/// Configuration for the Mapbox client.
#[derive(Debug, Clone)]
pub struct MapboxConfig {
    /// Access token sent as the `access_token` query parameter
    pub access_token: String,
    /// Base URL for the API (defaults to production Mapbox)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl MapboxConfig {
    /// Create a new config with the given access token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 10,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Mapbox API client.
///
/// Uses a semaphore to limit concurrent requests and stay under the
/// provider's rate limits.
#[derive(Debug, Clone)]
pub struct MapboxClient {
    http: reqwest::Client,
    base_url: Url,
    access_token: String,
    semaphore: Arc<Semaphore>,
}

impl MapboxClient {
    /// Create a new client with the given configuration.
    pub fn new(config: MapboxConfig) -> Result<Self, DirectionsError> {
        if config.access_token.is_empty() {
            return Err(DirectionsError::Unauthorized);
        }
        if config.max_concurrent == 0 {
            return Err(DirectionsError::Client(
                "max_concurrent must be at least 1".to_string(),
            ));
        }

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| DirectionsError::Client(format!("invalid base URL: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url,
            access_token: config.access_token,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// Build an endpoint URL from path segments (percent-encoded).
    fn endpoint(&self, segments: &[&str]) -> Result<Url, DirectionsError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DirectionsError::Client("base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a GET request and decode the JSON body.
    ///
    /// Non-success statuses are returned as errors, except that bodies with
    /// a provider `code` are handed back when `decode_errors` is set so the
    /// caller can distinguish "no route" from a failure.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
        decode_errors: bool,
    ) -> Result<T, DirectionsError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| DirectionsError::Client("semaphore closed".to_string()))?;

        let response = self
            .http
            .get(url)
            .query(query)
            .query(&[("access_token", self.access_token.as_str())])
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(DirectionsError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DirectionsError::RateLimited);
        }

        let body = response.text().await?;

        if !status.is_success() {
            if decode_errors {
                if let Ok(decoded) = serde_json::from_str(&body) {
                    return Ok(decoded);
                }
            }
            return Err(DirectionsError::Api {
                status: status.as_u16(),
                message: body.chars().take(500).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| DirectionsError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

/// Format waypoints as the `lng,lat;lng,lat` path segment.
fn coordinate_path(points: &[GeoPoint]) -> String {
    points
        .iter()
        .map(|p| format!("{:.6},{:.6}", p.lng, p.lat))
        .collect::<Vec<_>>()
        .join(";")
}

impl DirectionsProvider for MapboxClient {
    async fn route(
        &self,
        points: &[GeoPoint],
        profile: Profile,
        alternatives: bool,
    ) -> Result<Vec<ProviderRoute>, DirectionsError> {
        if points.len() < 2 {
            return Err(DirectionsError::Client(
                "a route needs at least two waypoints".to_string(),
            ));
        }

        let coords = coordinate_path(points);
        let url = self.endpoint(&["directions", "v5", "mapbox", profile.as_str(), &coords])?;

        let response: DirectionsResponse = self
            .get_json(
                url,
                &[
                    ("alternatives", alternatives.to_string()),
                    ("geometries", "geojson".to_string()),
                    ("overview", "full".to_string()),
                ],
                true,
            )
            .await?;

        if response.is_no_route() {
            debug!(%profile, code = %response.code, "provider found no route");
            return Ok(Vec::new());
        }

        if response.code != "Ok" {
            return Err(DirectionsError::Provider {
                code: response.code,
                message: response.message.unwrap_or_default(),
            });
        }

        response
            .routes
            .into_iter()
            .filter(|r| !r.geometry.coordinates.is_empty())
            .map(|r| {
                r.into_route()
                    .map_err(|e| DirectionsError::InvalidResponse(e.to_string()))
            })
            .collect()
    }
}

impl Geocoder for MapboxClient {
    async fn describe(&self, point: &GeoPoint) -> Result<String, DirectionsError> {
        let query = format!("{:.6},{:.6}.json", point.lng, point.lat);
        let url = self.endpoint(&["geocoding", "v5", "mapbox.places", &query])?;

        let response: GeocodingResponse = self
            .get_json(
                url,
                &[
                    ("limit", "1".to_string()),
                    ("types", "address,poi".to_string()),
                ],
                false,
            )
            .await?;

        Ok(response
            .features
            .first()
            .map(|f| f.short_label().to_string())
            .unwrap_or_default())
    }

    async fn suggest(
        &self,
        query: &str,
        proximity: Option<&GeoPoint>,
    ) -> Result<Vec<PlaceSuggestion>, DirectionsError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let segment = format!("{trimmed}.json");
        let url = self.endpoint(&["geocoding", "v5", "mapbox.places", &segment])?;

        let mut params = vec![
            ("autocomplete", "true".to_string()),
            ("limit", SUGGEST_LIMIT.to_string()),
        ];
        if let Some(p) = proximity {
            params.push(("proximity", format!("{:.6},{:.6}", p.lng, p.lat)));
        }

        let response: GeocodingResponse = self.get_json(url, &params, false).await?;

        response
            .features
            .into_iter()
            .map(|f| {
                f.into_suggestion()
                    .map_err(|e| DirectionsError::InvalidResponse(e.to_string()))
            })
            .collect()
    }
}
