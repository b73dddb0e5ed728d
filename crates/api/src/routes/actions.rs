//! Route definitions for action rights.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::actions;
use crate::state::AppState;

/// Action right routes mounted at `/actions`.
///
/// ```text
/// PUT /           -> grant
/// GET /{action}   -> check
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", put(actions::grant))
        .route("/{action}", get(actions::check))
}
