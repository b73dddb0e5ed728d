//! Thin CRUD handlers over the record store.
//!
//! Listing goes through the resolved table view: the view's predicate and
//! sort drive the query, and the read-rights map strips unreadable fields
//! from every returned row.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{Map, Value};
use tempo_core::entity::Entity;
use tempo_core::error::CoreError;
use tempo_core::types::DbId;
use tempo_db::repositories::RecordRepo;

use crate::error::AppResult;
use crate::handlers::permissions::UserQuery;
use crate::handlers::table_view::load_table_view;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/entities/{entity}/records?user_id=
pub async fn list(
    Path(entity): Path<String>,
    Query(query): Query<UserQuery>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let entity = Entity::parse(&entity)?;
    let (view, read_rights) = load_table_view(&state.pool, entity, query.user_id).await?;

    let mut rows = RecordRepo::query(&state.pool, entity, view.predicate.as_ref(), &view.sort).await?;

    // Keys absent from the rights map (bookkeeping) pass through; keys
    // present with false are stripped.
    for row in &mut rows {
        if let Some(obj) = row.as_object_mut() {
            obj.retain(|key, _| read_rights.get(key).copied().unwrap_or(true));
        }
    }

    Ok(Json(DataResponse { data: rows }))
}

/// POST /api/v1/entities/{entity}/records
pub async fn create(
    Path(entity): Path<String>,
    State(state): State<AppState>,
    Json(fields): Json<Map<String, Value>>,
) -> AppResult<impl IntoResponse> {
    let entity = Entity::parse(&entity)?;
    let id = RecordRepo::insert(&state.pool, entity, &fields).await?;

    tracing::info!(entity = entity.as_str(), record_id = id, "Record created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: serde_json::json!({ "id": id }),
        }),
    ))
}

/// PUT /api/v1/entities/{entity}/records/{id}
pub async fn update(
    Path((entity, id)): Path<(String, DbId)>,
    State(state): State<AppState>,
    Json(fields): Json<Map<String, Value>>,
) -> AppResult<impl IntoResponse> {
    let entity = Entity::parse(&entity)?;
    let updated = RecordRepo::update(&state.pool, entity, id, &fields).await?;
    if !updated {
        return Err(CoreError::NotFound {
            entity: "record",
            id,
        }
        .into());
    }

    Ok(Json(DataResponse {
        data: serde_json::json!({ "id": id }),
    }))
}

/// DELETE /api/v1/entities/{entity}/records/{id}
///
/// Soft delete: the row keeps its data but disappears from every listing.
pub async fn delete(
    Path((entity, id)): Path<(String, DbId)>,
    State(state): State<AppState>,
) -> AppResult<StatusCode> {
    let entity = Entity::parse(&entity)?;
    let deleted = RecordRepo::soft_delete(&state.pool, entity, id).await?;
    if !deleted {
        return Err(CoreError::NotFound {
            entity: "record",
            id,
        }
        .into());
    }
    Ok(StatusCode::NO_CONTENT)
}
