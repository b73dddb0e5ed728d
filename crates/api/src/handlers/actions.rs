//! Handlers for coarse-grained action rights.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tempo_core::permission::{resolve_action_right, ActionGrant};
use tempo_core::role::Role;
use tempo_db::repositories::{ActionRightRepo, UserRoleRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::permissions::UserQuery;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GrantActionRequest {
    pub role_id: i16,
    pub action: String,
    pub allowed: bool,
}

/// GET /api/v1/actions/{action}?user_id=
///
/// Whether any of the user's roles carries an explicit `true` grant for
/// the action. Deny-by-default: no grant rows means `false`, not an error.
pub async fn check(
    Path(action): Path<String>,
    Query(query): Query<UserQuery>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let roles = UserRoleRepo::roles_of(&state.pool, query.user_id).await?;
    let grants: Vec<ActionGrant> = ActionRightRepo::list_for_action(&state.pool, &action)
        .await?
        .iter()
        .filter_map(|row| row.to_grant())
        .collect();

    let allowed = resolve_action_right(&grants, &roles, &action);

    Ok(Json(DataResponse {
        data: serde_json::json!({ "action": action, "allowed": allowed }),
    }))
}

/// PUT /api/v1/actions
///
/// Upsert one (role, action) grant row.
pub async fn grant(
    State(state): State<AppState>,
    Json(input): Json<GrantActionRequest>,
) -> AppResult<impl IntoResponse> {
    let role = Role::from_id(input.role_id)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown role id {}", input.role_id)))?;

    let row = ActionRightRepo::upsert(&state.pool, role, &input.action, input.allowed).await?;

    tracing::info!(
        role = role.as_str(),
        action = %input.action,
        allowed = input.allowed,
        "Action right saved",
    );

    Ok(Json(DataResponse { data: row }))
}
