//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Local, Timelike};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::directions::{DirectionsError, Geocoder, PlaceSuggestion};
use crate::discovery::{
    Discovery, DiscoveryError, GenerationToken, describe_candidates,
};
use crate::domain::{GeoPoint, InvalidPoint};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/discover", post(discover))
        .route("/places/suggest", get(suggest_places))
        .route("/places/describe", get(describe_place))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Discover alternate drop-off points for a trip.
async fn discover(
    State(state): State<AppState>,
    Json(req): Json<DiscoverRequest>,
) -> Result<Json<DiscoverResponse>, AppError> {
    let request = req.to_request(&state.config, Local::now().hour());

    let token = match &req.session {
        Some(session) => state.generations.begin(session),
        None => GenerationToken::detached(),
    };

    let directions = state.directions.as_ref();
    let mut result = Discovery::new(directions, &state.config)
        .discover(&request, &token)
        .await?;

    describe_candidates(
        directions,
        &mut result.suggestions,
        state.config.max_concurrent_probes,
    )
    .await;
    token.ensure_current()?;

    Ok(Json(DiscoverResponse {
        generation: req.session.as_ref().map(|_| token.generation()),
        result,
    }))
}

/// Search-as-you-type place suggestions.
async fn suggest_places(
    State(state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> Result<Json<Vec<PlaceSuggestion>>, AppError> {
    if query.q.trim().is_empty() {
        return Err(AppError::BadRequest {
            message: "query must not be empty".to_string(),
        });
    }

    let proximity = match (query.lat, query.lng) {
        (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)?),
        (None, None) => None,
        _ => {
            return Err(AppError::BadRequest {
                message: "lat and lng must be given together".to_string(),
            });
        }
    };

    let suggestions = state
        .directions
        .suggest(&query.q, proximity.as_ref())
        .await?;
    Ok(Json(suggestions))
}

/// Short label for a point.
async fn describe_place(
    State(state): State<AppState>,
    Query(query): Query<DescribeQuery>,
) -> Result<Json<DescribeResponse>, AppError> {
    let point = GeoPoint::new(query.lat, query.lng)?;
    let label = state.directions.describe(&point).await?;
    Ok(Json(DescribeResponse { label }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Conflict { message: String },
    Upstream { message: String },
    Internal { message: String },
}

impl From<DiscoveryError> for AppError {
    fn from(e: DiscoveryError) -> Self {
        match e {
            DiscoveryError::InvalidRequest(_) => AppError::BadRequest {
                message: e.to_string(),
            },
            DiscoveryError::Superseded => AppError::Conflict {
                message: e.to_string(),
            },
            DiscoveryError::InvalidConfig(_) => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<DirectionsError> for AppError {
    fn from(e: DirectionsError) -> Self {
        AppError::Upstream {
            message: e.to_string(),
        }
    }
}

impl From<InvalidPoint> for AppError {
    fn from(e: InvalidPoint) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message),
            AppError::Upstream { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheConfig, CachedDirections};
    use crate::directions::{Backend, SyntheticDirections};
    use crate::discovery::{DiscoveryConfig, Generations, VisibleRoutes};

    fn state() -> AppState {
        let backend = Backend::Synthetic(SyntheticDirections::default());
        AppState::new(
            CachedDirections::new(backend, &CacheConfig::default()),
            DiscoveryConfig::default(),
            Generations::default(),
        )
    }

    fn trip(session: Option<&str>) -> DiscoverRequest {
        DiscoverRequest {
            session: session.map(str::to_string),
            pickup: GeoPoint::new(40.70, -74.00).unwrap(),
            destination: GeoPoint::new(40.75, -74.00).unwrap(),
            walk_radius_m: None,
            visible_routes: VisibleRoutes::All,
            hour: Some(12),
        }
    }

    #[test]
    fn error_status_codes() {
        let cases = [
            (
                AppError::from(DiscoveryError::InvalidRequest("x".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::from(DiscoveryError::Superseded),
                StatusCode::CONFLICT,
            ),
            (
                AppError::from(DiscoveryError::InvalidConfig("x".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::from(DirectionsError::RateLimited),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn health_is_ok() {
        assert_eq!(health().await, "ok");
    }

    #[tokio::test]
    async fn discover_returns_suggestions() {
        let Json(response) = discover(State(state()), Json(trip(Some("rider"))))
            .await
            .unwrap();

        assert_eq!(response.generation, Some(1));
        assert!(response.result.baseline.is_some());
        assert!(!response.result.suggestions.is_empty());
        for c in &response.result.suggestions {
            assert!(!c.label.is_empty());
        }
    }

    #[tokio::test]
    async fn discover_rejects_bad_radius() {
        let mut req = trip(None);
        req.walk_radius_m = Some(-5.0);

        let err = discover(State(state()), Json(req)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn describe_validates_point() {
        let err = describe_place(State(state()), Query(DescribeQuery { lat: 95.0, lng: 0.0 }))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let Json(label) =
            describe_place(State(state()), Query(DescribeQuery { lat: 40.7, lng: -74.0 }))
                .await
                .unwrap();
        assert_eq!(label.label, "40.70000, -74.00000");
    }

    #[tokio::test]
    async fn suggest_needs_query_and_paired_coordinates() {
        let empty = SuggestQuery {
            q: "  ".into(),
            lat: None,
            lng: None,
        };
        assert!(suggest_places(State(state()), Query(empty)).await.is_err());

        let half = SuggestQuery {
            q: "coffee".into(),
            lat: Some(40.7),
            lng: None,
        };
        assert!(suggest_places(State(state()), Query(half)).await.is_err());
    }
}
