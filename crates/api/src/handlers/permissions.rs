//! Handlers for the field permission grid and resolution endpoints.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tempo_core::entity::{dynamic_field_key, is_bookkeeping_field, Entity};
use tempo_core::error::CoreError;
use tempo_core::permission::{FieldRight, FieldRights};
use tempo_core::role::Role;
use tempo_core::types::DbId;
use tempo_db::repositories::{DynamicFieldRepo, FieldPermissionRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// One role's row in the admin permission grid.
#[derive(Debug, Serialize)]
pub struct MatrixRow {
    pub role: &'static str,
    pub role_id: i16,
    pub fields: BTreeMap<String, FieldRights>,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: DbId,
}

#[derive(Debug, Deserialize)]
pub struct SaveGrantRequest {
    pub role_id: i16,
    pub field: String,
    #[serde(default)]
    pub can_view: bool,
    #[serde(default)]
    pub can_read: bool,
    #[serde(default)]
    pub can_write: bool,
    #[serde(default)]
    pub can_delete: bool,
    #[serde(default)]
    pub can_view_add_info: bool,
}

/// GET /api/v1/permissions/{entity}
///
/// The admin grid: every role crossed with every permission-gated field,
/// static and dynamic. A missing grant row surfaces as all-false,
/// indistinguishable from an explicit all-false row. Stored grants for
/// fields outside the current schema (e.g. deleted dynamic fields) still
/// appear so they can be audited.
pub async fn matrix(
    Path(entity): Path<String>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let entity = Entity::parse(&entity)?;
    let rows = FieldPermissionRepo::list_for_entity(&state.pool, entity).await?;

    let mut field_keys: Vec<String> = entity
        .static_fields()
        .iter()
        .filter(|d| d.requires_permission)
        .map(|d| d.name.clone())
        .collect();
    for field in DynamicFieldRepo::list_for_entity(&state.pool, entity).await? {
        field_keys.push(dynamic_field_key(field.id));
    }
    for row in &rows {
        if !field_keys.contains(&row.field) {
            field_keys.push(row.field.clone());
        }
    }

    let matrix: Vec<MatrixRow> = Role::all()
        .iter()
        .map(|role| {
            let fields = field_keys
                .iter()
                .map(|key| {
                    let rights = rows
                        .iter()
                        .find(|r| r.role_id == role.id() && &r.field == key)
                        .map(|r| FieldRights {
                            can_view: r.can_view,
                            can_read: r.can_read,
                            can_write: r.can_write,
                            can_delete: r.can_delete,
                            can_view_add_info: r.can_view_add_info,
                        })
                        .unwrap_or_default();
                    (key.clone(), rights)
                })
                .collect();
            MatrixRow {
                role: role.as_str(),
                role_id: role.id(),
                fields,
            }
        })
        .collect();

    Ok(Json(DataResponse { data: matrix }))
}

/// PUT /api/v1/permissions/{entity}
///
/// Save one (role, field) grant. Rights are run through the cascade
/// normalization before storage, so a write grant always implies read and
/// view, and delete implies all three.
pub async fn save_grant(
    Path(entity): Path<String>,
    State(state): State<AppState>,
    Json(input): Json<SaveGrantRequest>,
) -> AppResult<impl IntoResponse> {
    let entity = Entity::parse(&entity)?;
    let role = Role::from_id(input.role_id)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown role id {}", input.role_id)))?;

    if is_bookkeeping_field(&input.field) {
        return Err(CoreError::Validation(format!(
            "Field '{}' is not permission-managed",
            input.field
        ))
        .into());
    }

    let rights = FieldRights {
        can_view: input.can_view,
        can_read: input.can_read,
        can_write: input.can_write,
        can_delete: input.can_delete,
        can_view_add_info: input.can_view_add_info,
    }
    .normalized();

    let row = FieldPermissionRepo::upsert(&state.pool, role, entity, &input.field, rights).await?;

    tracing::info!(
        role = role.as_str(),
        entity = entity.as_str(),
        field = %input.field,
        "Field permission saved",
    );

    Ok(Json(DataResponse { data: row }))
}

/// GET /api/v1/permissions/{entity}/readable?user_id=
///
/// The read-rights map for a user over the entity's full field set
/// (static and dynamic). Callers use it to strip unreadable fields from
/// payloads.
pub async fn readable_fields(
    Path(entity): Path<String>,
    Query(query): Query<UserQuery>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let entity = Entity::parse(&entity)?;
    let rights =
        super::resolve_user_rights(&state.pool, entity, query.user_id, FieldRight::Read).await?;
    Ok(Json(DataResponse { data: rights }))
}
