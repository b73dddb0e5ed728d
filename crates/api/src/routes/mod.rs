//! Route composition.
//!
//! Each resource gets its own module with a `router()` (or several) that
//! [`api_routes`] assembles into the `/api/v1` tree. The health check is
//! mounted at the root level separately.

pub mod actions;
pub mod dynamic_fields;
pub mod health;
pub mod permissions;
pub mod records;
pub mod table_view;

use axum::Router;

use crate::state::AppState;

/// The full API route tree mounted under `/api/v1`.
///
/// ```text
/// /permissions/{entity}                            matrix, save grant (GET, PUT)
/// /permissions/{entity}/readable                   readable-field map (GET)
/// /actions                                         save grant (PUT)
/// /actions/{action}                                check (GET)
///
/// /entities/{entity}/dynamic-fields                list, create (GET, POST)
/// /dynamic-fields/{id}                             update, delete (PUT, DELETE)
/// /dynamic-fields/{id}/options                     list, create (GET, POST)
/// /dynamic-fields/{id}/options/reorder             reorder (PUT)
/// /dynamic-fields/{id}/records/{record_id}/value   save value (PUT)
/// /options/{id}                                    rename, delete (PUT, DELETE)
/// /records/{record_id}/values                      resolved values (GET)
///
/// /entities/{entity}/records                       list, create (GET, POST)
/// /entities/{entity}/records/{id}                  update, soft delete (PUT, DELETE)
///
/// /table-view/{entity}                             resolved view (GET)
/// /table-view/{entity}/settings                    save setting row (PUT)
/// /table-view/{entity}/settings/filter             remove filter rule (DELETE)
/// /table-view/{entity}/fields-ordering             get, replace, reset (GET, PUT, DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Permission grid and resolution.
        .nest("/permissions", permissions::router())
        // Coarse-grained action rights.
        .nest("/actions", actions::router())
        // Dynamic field declarations, entity-scoped and field-scoped.
        .nest(
            "/entities/{entity}/dynamic-fields",
            dynamic_fields::entity_router(),
        )
        .nest("/dynamic-fields", dynamic_fields::field_router())
        .nest("/options", dynamic_fields::option_router())
        // Entity record CRUD over the record store.
        .nest("/entities/{entity}/records", records::entity_router())
        // Resolved dynamic values per record.
        .nest("/records", records::values_router())
        // View configuration resolver and table settings.
        .nest("/table-view", table_view::router())
}
