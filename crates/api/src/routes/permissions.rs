//! Route definitions for field permission management.

use axum::routing::get;
use axum::Router;

use crate::handlers::permissions;
use crate::state::AppState;

/// Permission routes mounted at `/permissions`.
///
/// ```text
/// GET /{entity}           -> matrix
/// PUT /{entity}           -> save_grant
/// GET /{entity}/readable  -> readable_fields
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{entity}",
            get(permissions::matrix).put(permissions::save_grant),
        )
        .route("/{entity}/readable", get(permissions::readable_fields))
}
