use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use dropoff_server::cache::CachedDirections;
use dropoff_server::directions::{Backend, MapboxClient, SyntheticDirections};
use dropoff_server::settings::Settings;
use dropoff_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dropoff_server=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let settings = Settings::load(&args).expect("Failed to load settings");

    let backend = match settings.mapbox_config() {
        Some(config) => {
            Backend::Mapbox(MapboxClient::new(config).expect("Failed to create Mapbox client"))
        }
        None => {
            warn!("MAPBOX_TOKEN not set, using offline synthetic directions");
            Backend::Synthetic(SyntheticDirections::default())
        }
    };
    info!(backend = backend.name(), "directions provider ready");

    let directions = CachedDirections::new(backend, &settings.cache_config());
    let state = AppState::new(
        directions,
        settings.discovery.clone(),
        settings.generations(),
    );
    let app = create_router(state);

    let addr = settings.server.bind;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    info!(%addr, "drop-off discovery listening");
    info!("  GET  /health            - Health check");
    info!("  POST /discover          - Suggest alternate drop-offs");
    info!("  GET  /places/suggest    - Place search");
    info!("  GET  /places/describe   - Reverse geocode a point");

    axum::serve(listener, app).await.expect("Server error");
}
