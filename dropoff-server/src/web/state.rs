//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedDirections;
use crate::directions::Backend;
use crate::discovery::{DiscoveryConfig, Generations};

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Cached routing and geocoding provider
    pub directions: Arc<CachedDirections<Backend>>,

    /// Discovery tuning
    pub config: Arc<DiscoveryConfig>,

    /// Per-session request generations
    pub generations: Generations,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        directions: CachedDirections<Backend>,
        config: DiscoveryConfig,
        generations: Generations,
    ) -> Self {
        Self {
            directions: Arc::new(directions),
            config: Arc::new(config),
            generations,
        }
    }
}
