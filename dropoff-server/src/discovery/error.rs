//! Discovery error types.

/// Error from drop-off discovery.
///
/// Provider failures never surface here: they are absorbed per point (or
/// turn into an empty route set). The worst outcome of a valid request is
/// an empty suggestion list.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DiscoveryError {
    /// Request rejected before any provider call
    #[error("invalid discovery request: {0}")]
    InvalidRequest(String),

    /// Configuration cannot be used
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A newer request for the same session replaced this one
    #[error("discovery superseded by a newer request")]
    Superseded,
}
