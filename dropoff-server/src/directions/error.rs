//! Directions provider error types.

/// Errors from a directions or geocoding provider.
///
/// "No route found" is not an error; providers report it as an empty
/// route list.
#[derive(Debug, thiserror::Error)]
pub enum DirectionsError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Provider answered with a non-success code in the body
    #[error("provider error {code}: {message}")]
    Provider { code: String, message: String },

    /// JSON deserialization failed
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Response parsed but contained unusable data
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limited by the provider
    #[error("rate limited by directions provider")]
    RateLimited,

    /// Invalid or missing access token
    #[error("unauthorized (check MAPBOX_TOKEN)")]
    Unauthorized,

    /// Client could not be constructed or is shutting down
    #[error("client error: {0}")]
    Client(String),
}
