//! Domain error types.
//!
//! These errors represent validation failures in the domain layer. They are
//! distinct from provider/IO errors.

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// Route has no geometry
    #[error("route geometry must contain at least one point")]
    EmptyGeometry,

    /// Route distance or duration is negative or non-finite
    #[error("invalid route {0}: must be finite and non-negative")]
    InvalidRouteStats(&'static str),
}
