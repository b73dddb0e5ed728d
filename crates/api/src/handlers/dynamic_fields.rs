//! Handlers for administrator-defined dynamic fields.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tempo_core::dynamic::FieldType;
use tempo_core::entity::Entity;
use tempo_core::error::CoreError;
use tempo_core::types::DbId;
use tempo_db::models::dynamic_field::{CreateDynamicField, UpdateDynamicField};
use tempo_db::repositories::DynamicFieldRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateFieldRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub multiple: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFieldRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub required: Option<bool>,
    pub multiple: Option<bool>,
}

/// GET /api/v1/entities/{entity}/dynamic-fields
pub async fn list(
    Path(entity): Path<String>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let entity = Entity::parse(&entity)?;
    let fields = DynamicFieldRepo::list_for_entity(&state.pool, entity).await?;
    Ok(Json(DataResponse { data: fields }))
}

/// POST /api/v1/entities/{entity}/dynamic-fields
pub async fn create(
    Path(entity): Path<String>,
    State(state): State<AppState>,
    Json(input): Json<CreateFieldRequest>,
) -> AppResult<impl IntoResponse> {
    let entity = Entity::parse(&entity)?;
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let field_type = FieldType::parse(&input.field_type)?;

    let field = DynamicFieldRepo::create(
        &state.pool,
        &CreateDynamicField {
            entity: entity.as_str().to_string(),
            title: input.title,
            field_type,
            required: input.required,
            multiple: input.multiple,
        },
    )
    .await?;

    tracing::info!(
        field_id = field.id,
        entity = entity.as_str(),
        field_type = field_type.as_str(),
        "Dynamic field created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: field })))
}

/// PUT /api/v1/dynamic-fields/{id}
///
/// Title, required, and multiple are editable; the type is immutable once
/// values may exist under it.
pub async fn update(
    Path(id): Path<DbId>,
    State(state): State<AppState>,
    Json(input): Json<UpdateFieldRequest>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let field = DynamicFieldRepo::update(
        &state.pool,
        id,
        &UpdateDynamicField {
            title: input.title,
            required: input.required,
            multiple: input.multiple,
        },
    )
    .await?
    .ok_or(CoreError::NotFound {
        entity: "dynamic field",
        id,
    })?;

    Ok(Json(DataResponse { data: field }))
}

/// DELETE /api/v1/dynamic-fields/{id}
///
/// Cascade: selections, options, and values go with the field, in one
/// transaction. Permission rows referencing the field stay behind.
pub async fn delete(Path(id): Path<DbId>, State(state): State<AppState>) -> AppResult<StatusCode> {
    let deleted = DynamicFieldRepo::delete_cascade(&state.pool, id).await?;
    if !deleted {
        return Err(CoreError::NotFound {
            entity: "dynamic field",
            id,
        }
        .into());
    }
    Ok(StatusCode::NO_CONTENT)
}
