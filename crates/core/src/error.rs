//! Domain error type shared by all tempo crates.

use crate::types::DbId;

/// Domain-level error. The API layer maps each variant to an HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity row was not found.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// Input failed a hard validation rule.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operation conflicts with existing state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The caller is not allowed to perform the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// An invariant was broken internally.
    #[error("Internal error: {0}")]
    Internal(String),
}
