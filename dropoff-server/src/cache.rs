//! Caching layer for provider responses.
//!
//! The tiers of one discovery request, and successive requests for nearby
//! trips, ask for the same walk and drive legs repeatedly. Keys use rounded
//! coordinates so float noise does not defeat the cache. Only successful
//! responses are cached; failures are always retried.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::trace;

use crate::directions::{
    DirectionsError, DirectionsProvider, Geocoder, PlaceSuggestion, Profile, ProviderRoute,
};
use crate::domain::{CoordKey, DEFAULT_KEY_DECIMALS, GeoPoint};

/// Cache key for routes: (profile, rounded waypoints, alternatives).
type RouteKey = (Profile, Vec<CoordKey>, bool);

/// Cached route list.
type RouteEntry = Arc<Vec<ProviderRoute>>;

/// Decimal places used for cache keys. Matches candidate deduplication, so
/// points that stay distinct candidates never share cached stats.
const KEY_DECIMALS: u32 = DEFAULT_KEY_DECIMALS;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries per cache.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(120),
            max_capacity: 10_000,
        }
    }
}

fn route_key(points: &[GeoPoint], profile: Profile, alternatives: bool) -> RouteKey {
    let coords = points
        .iter()
        .map(|p| CoordKey::new(p, KEY_DECIMALS))
        .collect();
    (profile, coords, alternatives)
}

/// Provider wrapper that caches routes and reverse-geocoding labels.
pub struct CachedDirections<P> {
    inner: P,
    routes: MokaCache<RouteKey, RouteEntry>,
    labels: MokaCache<CoordKey, String>,
}

impl<P> CachedDirections<P> {
    /// Wrap `inner` with caches built from `config`.
    pub fn new(inner: P, config: &CacheConfig) -> Self {
        let routes = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();
        let labels = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            inner,
            routes,
            labels,
        }
    }

    /// Access the underlying provider for operations that bypass cache.
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: DirectionsProvider> DirectionsProvider for CachedDirections<P> {
    async fn route(
        &self,
        points: &[GeoPoint],
        profile: Profile,
        alternatives: bool,
    ) -> Result<Vec<ProviderRoute>, DirectionsError> {
        let key = route_key(points, profile, alternatives);

        if let Some(cached) = self.routes.get(&key).await {
            trace!(%profile, "route cache hit");
            return Ok(cached.as_ref().clone());
        }

        let routes = self.inner.route(points, profile, alternatives).await?;
        self.routes.insert(key, Arc::new(routes.clone())).await;

        Ok(routes)
    }
}

impl<P: Geocoder> Geocoder for CachedDirections<P> {
    async fn describe(&self, point: &GeoPoint) -> Result<String, DirectionsError> {
        let key = CoordKey::new(point, KEY_DECIMALS);

        if let Some(cached) = self.labels.get(&key).await {
            return Ok(cached);
        }

        let label = self.inner.describe(point).await?;
        self.labels.insert(key, label.clone()).await;

        Ok(label)
    }

    async fn suggest(
        &self,
        query: &str,
        proximity: Option<&GeoPoint>,
    ) -> Result<Vec<PlaceSuggestion>, DirectionsError> {
        // Search-as-you-type queries rarely repeat exactly; not cached.
        self.inner.suggest(query, proximity).await
    }
}
