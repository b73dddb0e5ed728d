//! Route definitions for entity records and their dynamic values.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{dynamic_values, records};
use crate::state::AppState;

/// Record CRUD routes mounted at `/entities/{entity}/records`.
///
/// ```text
/// GET    /      -> list (through the resolved view)
/// POST   /      -> create
/// PUT    /{id}  -> update
/// DELETE /{id}  -> soft delete
/// ```
pub fn entity_router() -> Router<AppState> {
    Router::new()
        .route("/", get(records::list).post(records::create))
        .route("/{id}", put(records::update).delete(records::delete))
}

/// Resolved-value routes mounted at `/records`.
///
/// ```text
/// GET /{record_id}/values -> values_for_record
/// ```
pub fn values_router() -> Router<AppState> {
    Router::new().route("/{record_id}/values", get(dynamic_values::values_for_record))
}
