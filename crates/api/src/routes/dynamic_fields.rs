//! Route definitions for dynamic fields, their options, and value saves.
//!
//! Three routers are provided:
//! - `entity_router()` mounted at `/entities/{entity}/dynamic-fields`
//! - `field_router()` mounted at `/dynamic-fields`
//! - `option_router()` mounted at `/options`

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{dropdown_options, dynamic_fields, dynamic_values};
use crate::state::AppState;

/// Entity-scoped declaration routes.
///
/// ```text
/// GET  / -> list
/// POST / -> create
/// ```
pub fn entity_router() -> Router<AppState> {
    Router::new().route("/", get(dynamic_fields::list).post(dynamic_fields::create))
}

/// Field-scoped routes.
///
/// ```text
/// PUT    /{id}                             -> update
/// DELETE /{id}                             -> delete (cascade)
/// GET    /{id}/options                     -> list options
/// POST   /{id}/options                     -> create option
/// PUT    /{id}/options/reorder             -> reorder options
/// PUT    /{id}/records/{record_id}/value   -> save value
/// ```
pub fn field_router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            put(dynamic_fields::update).delete(dynamic_fields::delete),
        )
        .route(
            "/{id}/options",
            get(dropdown_options::list).post(dropdown_options::create),
        )
        .route("/{id}/options/reorder", put(dropdown_options::reorder))
        .route(
            "/{id}/records/{record_id}/value",
            put(dynamic_values::save_value),
        )
}

/// Option-scoped routes.
///
/// ```text
/// PUT    /{id} -> update (rename)
/// DELETE /{id} -> delete
/// ```
pub fn option_router() -> Router<AppState> {
    Router::new().route(
        "/{id}",
        put(dropdown_options::update).delete(dropdown_options::delete),
    )
}
