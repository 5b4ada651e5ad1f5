//! Domain error types.
//!
//! These errors represent validation failures in the domain layer. They are
//! distinct from API/IO errors.

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DomainError {
    /// A route option must carry at least one leg
    #[error("route option must have at least one leg")]
    EmptyRoute,

    /// Coordinate with a non-finite component
    #[error("coordinate must be finite: ({0}, {1})")]
    NonFiniteCoordinate(f64, f64),

    /// Session identifier was empty
    #[error("session identifier must not be empty")]
    EmptySessionId,
}
