//! Handlers for dropdown option management.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use sqlx::PgPool;
use tempo_core::error::CoreError;
use tempo_core::types::DbId;
use tempo_db::models::dynamic_field::DynamicField;
use tempo_db::repositories::{DropdownOptionRepo, DynamicFieldRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct OptionLabelRequest {
    #[validate(length(min = 1, max = 255))]
    pub label: String,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub option_ids: Vec<DbId>,
}

async fn require_dropdown_field(pool: &PgPool, id: DbId) -> AppResult<DynamicField> {
    let field = DynamicFieldRepo::find_by_id(pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "dynamic field",
            id,
        })?;
    if !field.kind()?.is_dropdown() {
        return Err(CoreError::Validation(format!(
            "Field '{}' is not a dropdown field",
            field.title
        ))
        .into());
    }
    Ok(field)
}

/// GET /api/v1/dynamic-fields/{id}/options
pub async fn list(
    Path(field_id): Path<DbId>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    require_dropdown_field(&state.pool, field_id).await?;
    let options = DropdownOptionRepo::list_for_field(&state.pool, field_id).await?;
    Ok(Json(DataResponse { data: options }))
}

/// POST /api/v1/dynamic-fields/{id}/options
///
/// The new option takes the next position (max ordering + 1).
pub async fn create(
    Path(field_id): Path<DbId>,
    State(state): State<AppState>,
    Json(input): Json<OptionLabelRequest>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    require_dropdown_field(&state.pool, field_id).await?;

    let option = DropdownOptionRepo::create(&state.pool, field_id, &input.label).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: option })))
}

/// PUT /api/v1/options/{id}
pub async fn update(
    Path(id): Path<DbId>,
    State(state): State<AppState>,
    Json(input): Json<OptionLabelRequest>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let option = DropdownOptionRepo::update_label(&state.pool, id, &input.label)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "dropdown option",
            id,
        })?;

    Ok(Json(DataResponse { data: option }))
}

/// DELETE /api/v1/options/{id}
///
/// Selections pointing at the option are removed in the same transaction.
pub async fn delete(Path(id): Path<DbId>, State(state): State<AppState>) -> AppResult<StatusCode> {
    let deleted = DropdownOptionRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(CoreError::NotFound {
            entity: "dropdown option",
            id,
        }
        .into());
    }
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/dynamic-fields/{id}/options/reorder
///
/// The given ids take positions 1..N. Rejected without effect when any id
/// does not belong to the field.
pub async fn reorder(
    Path(field_id): Path<DbId>,
    State(state): State<AppState>,
    Json(input): Json<ReorderRequest>,
) -> AppResult<impl IntoResponse> {
    require_dropdown_field(&state.pool, field_id).await?;

    let applied = DropdownOptionRepo::reorder(&state.pool, field_id, &input.option_ids).await?;
    if !applied {
        return Err(CoreError::Validation(
            "One or more option ids do not belong to this field".into(),
        )
        .into());
    }

    let options = DropdownOptionRepo::list_for_field(&state.pool, field_id).await?;
    Ok(Json(DataResponse { data: options }))
}
