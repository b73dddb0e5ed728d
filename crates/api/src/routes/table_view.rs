//! Route definitions for the view resolver and table settings.

use axum::routing::{delete, get, put};
use axum::Router;

use crate::handlers::table_view;
use crate::state::AppState;

/// Table view routes mounted at `/table-view`.
///
/// ```text
/// GET    /{entity}                  -> resolve
/// PUT    /{entity}/settings         -> save_setting
/// DELETE /{entity}/settings/filter  -> delete_filter
/// GET    /{entity}/fields-ordering  -> get_fields_ordering
/// PUT    /{entity}/fields-ordering  -> save_fields_ordering
/// DELETE /{entity}/fields-ordering  -> reset_fields_ordering
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{entity}", get(table_view::resolve))
        .route("/{entity}/settings", put(table_view::save_setting))
        .route("/{entity}/settings/filter", delete(table_view::delete_filter))
        .route(
            "/{entity}/fields-ordering",
            get(table_view::get_fields_ordering)
                .put(table_view::save_fields_ordering)
                .delete(table_view::reset_fields_ordering),
        )
}
