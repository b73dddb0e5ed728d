//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope per project
//! conventions. Use [`DataResponse`] instead of ad-hoc
//! `serde_json::json!({ "data": ... })` to get compile-time type safety and
//! consistent serialization.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Soft-validation response body: the request was well-formed but the
/// submitted value failed record-level validation. Carried with a 422
/// status, never as an error type.
#[derive(Debug, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<String>,
}
