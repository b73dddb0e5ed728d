//! Handlers for saving and reading dynamic-field values.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use tempo_core::dynamic::{coerce_scalar, validate_value, DynamicFieldSpec};
use tempo_core::entity::Entity;
use tempo_core::error::CoreError;
use tempo_core::types::DbId;
use tempo_core::value::{resolve_record_values, LoadedScalar, LoadedSelection, OptionLabel};
use tempo_db::repositories::{
    DropdownOptionRepo, DropdownSelectionRepo, DynamicFieldRepo, DynamicValueRepo,
};

use crate::error::{AppError, AppResult};
use crate::response::{DataResponse, ValidationErrors};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SaveValueRequest {
    pub value: Value,
}

#[derive(Debug, Deserialize)]
pub struct EntityQuery {
    pub entity: String,
}

/// PUT /api/v1/dynamic-fields/{id}/records/{record_id}/value
///
/// Scalar fields upsert into the typed column picked by the field's type;
/// dropdown fields short-circuit to selection handling (replace-all) and
/// never touch the scalar columns. Validation problems come back as a 422
/// body with an `errors` list, not as an error type.
pub async fn save_value(
    Path((field_id, record_id)): Path<(DbId, DbId)>,
    State(state): State<AppState>,
    Json(input): Json<SaveValueRequest>,
) -> AppResult<Response> {
    let field = DynamicFieldRepo::find_by_id(&state.pool, field_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "dynamic field",
            id: field_id,
        })?;
    let kind = field.kind()?;

    let errors = validate_value(&field.title, kind, field.required, &input.value);
    if !errors.is_empty() {
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(ValidationErrors { errors }))
            .into_response());
    }

    if kind.is_dropdown() {
        let option_ids = selection_ids(&input.value)?;
        if !field.multiple && option_ids.len() > 1 {
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ValidationErrors {
                    errors: vec![format!("{} accepts a single option", field.title)],
                }),
            )
                .into_response());
        }
        if !option_ids.is_empty() {
            let known: Vec<DbId> = DropdownOptionRepo::list_for_field(&state.pool, field_id)
                .await?
                .iter()
                .map(|o| o.id)
                .collect();
            if let Some(missing) = option_ids.iter().find(|id| !known.contains(id)) {
                return Err(CoreError::Validation(format!(
                    "Option {missing} not found for field '{}'",
                    field.title
                ))
                .into());
            }
        }

        DropdownSelectionRepo::replace_all(&state.pool, field_id, record_id, &option_ids).await?;
        return Ok(Json(DataResponse {
            data: serde_json::json!({
                "field_id": field_id,
                "record_id": record_id,
                "option_ids": option_ids,
            }),
        })
        .into_response());
    }

    let value = coerce_scalar(kind, &input.value)?;
    let row = DynamicValueRepo::upsert(&state.pool, field_id, record_id, value).await?;
    Ok(Json(DataResponse { data: row }).into_response())
}

/// GET /api/v1/records/{record_id}/values?entity=
///
/// All resolved dynamic values for one record: scalars typed, dropdown
/// selections as option labels joined with `", "`. Fields without a stored
/// value are omitted.
pub async fn values_for_record(
    Path(record_id): Path<DbId>,
    Query(query): Query<EntityQuery>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let entity = Entity::parse(&query.entity)?;
    let fields = DynamicFieldRepo::list_for_entity(&state.pool, entity).await?;
    let specs: Vec<DynamicFieldSpec> = fields
        .iter()
        .map(|f| f.to_spec())
        .collect::<Result<_, _>>()?;

    let scalars: Vec<LoadedScalar> = DynamicValueRepo::list_for_record(&state.pool, record_id)
        .await?
        .iter()
        .filter_map(|row| {
            let spec = specs.iter().find(|s| s.id == row.field_id)?;
            row.decode(spec.field_type).map(|value| LoadedScalar {
                field_id: row.field_id,
                value,
            })
        })
        .collect();

    let selections: Vec<LoadedSelection> =
        DropdownSelectionRepo::list_for_record(&state.pool, record_id)
            .await?
            .iter()
            .map(|s| LoadedSelection {
                field_id: s.field_id,
                option_id: s.option_id,
            })
            .collect();

    let mut options = Vec::new();
    for spec in specs.iter().filter(|s| s.field_type.is_dropdown()) {
        options.extend(
            DropdownOptionRepo::list_for_field(&state.pool, spec.id)
                .await?
                .into_iter()
                .map(|o| OptionLabel {
                    id: o.id,
                    label: o.label,
                }),
        );
    }

    let values = resolve_record_values(&specs, &scalars, &selections, &options);
    Ok(Json(DataResponse {
        data: values.into_values().collect::<Vec<_>>(),
    }))
}

/// A selection payload is null (clear), one option id, or an id array.
fn selection_ids(raw: &Value) -> AppResult<Vec<DbId>> {
    match raw {
        Value::Null => Ok(Vec::new()),
        Value::Number(n) => n
            .as_i64()
            .map(|id| vec![id])
            .ok_or_else(|| AppError::BadRequest("Option id must be an integer".into())),
        Value::Array(items) => items
            .iter()
            .map(|v| {
                v.as_i64()
                    .ok_or_else(|| AppError::BadRequest("Option ids must be integers".into()))
            })
            .collect(),
        _ => Err(AppError::BadRequest(
            "Expected an option id, an id array, or null".into(),
        )),
    }
}
