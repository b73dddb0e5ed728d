//! Handlers for the view configuration resolver and table settings.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use tempo_core::dynamic::DynamicFieldSpec;
use tempo_core::entity::Entity;
use tempo_core::permission::{resolve_field_rights, FieldGrant, FieldRight};
use tempo_core::predicate::{FilterOp, SortDirection};
use tempo_core::settings::{merge_by_column, FilterRule, SettingRow, SortRule, ViewRule};
use tempo_core::types::DbId;
use tempo_core::view::{resolve_view, TableView, ViewSettings};
use tempo_db::repositories::{
    DynamicFieldRepo, FieldPermissionRepo, FieldsOrderingRepo, TableSettingRepo, UserRoleRepo,
};

use crate::error::{AppError, AppResult};
use crate::handlers::permissions::UserQuery;
use crate::response::DataResponse;
use crate::state::AppState;

/// The kind-specific part of a setting save.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SettingPayload {
    View {
        #[serde(default)]
        hidden: bool,
        width: Option<i32>,
    },
    Ordering {
        ordering: i32,
    },
    Sort {
        direction: String,
        priority: i32,
    },
    Filter {
        operator: String,
        value: Value,
    },
}

#[derive(Debug, Deserialize)]
pub struct SaveSettingRequest {
    pub user_id: Option<DbId>,
    /// When set, the row becomes the organization-wide default and
    /// `user_id` is ignored.
    #[serde(default)]
    pub for_all: bool,
    pub column: String,
    #[serde(flatten)]
    pub payload: SettingPayload,
}

#[derive(Debug, Deserialize)]
pub struct FilterScopeQuery {
    pub user_id: Option<DbId>,
    #[serde(default)]
    pub for_all: bool,
    pub column: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveFieldsOrderingRequest {
    pub user_id: DbId,
    /// Field keys in the desired display order; positions become 1..N.
    pub fields: Vec<String>,
}

/// Load and resolve the effective table view for one (user, entity) pair.
///
/// Also returns the read-rights map so callers can strip unreadable
/// fields from row payloads without resolving twice.
pub(crate) async fn load_table_view(
    pool: &PgPool,
    entity: Entity,
    user_id: DbId,
) -> AppResult<(TableView, BTreeMap<String, bool>)> {
    let roles = UserRoleRepo::roles_of(pool, user_id).await?;
    let grants: Vec<FieldGrant> = FieldPermissionRepo::list_for_entity(pool, entity)
        .await?
        .iter()
        .filter_map(|row| row.to_grant())
        .collect();

    let dynamic_rows = DynamicFieldRepo::list_for_entity(pool, entity).await?;
    let dynamic: Vec<DynamicFieldSpec> = dynamic_rows
        .iter()
        .map(|f| f.to_spec())
        .collect::<Result<_, _>>()?;

    let fields = super::resolvable_fields(entity, &dynamic_rows);
    let read_rights = resolve_field_rights(&fields, &grants, &roles, FieldRight::Read);

    let view_rows = TableSettingRepo::list_view(pool, entity, user_id).await?;
    let ordering_rows = TableSettingRepo::list_ordering(pool, entity, user_id).await?;
    let sort_rows = TableSettingRepo::list_sort(pool, entity, user_id).await?;
    let filter_rows = TableSettingRepo::list_filter(pool, entity, user_id).await?;

    // Rows with an unparsable direction or operator are skipped rather
    // than failing the whole resolve.
    let settings = ViewSettings {
        view: merge_by_column(
            view_rows
                .into_iter()
                .map(|r| SettingRow {
                    column: r.column_key,
                    personal: r.user_id.is_some(),
                    rule: ViewRule {
                        hidden: r.hidden,
                        width: r.width,
                    },
                })
                .collect(),
        ),
        ordering: merge_by_column(
            ordering_rows
                .into_iter()
                .map(|r| SettingRow {
                    column: r.column_key,
                    personal: r.user_id.is_some(),
                    rule: r.ordering,
                })
                .collect(),
        ),
        sort: merge_by_column(
            sort_rows
                .into_iter()
                .filter_map(|r| {
                    let direction = SortDirection::parse(&r.direction).ok()?;
                    Some(SettingRow {
                        column: r.column_key,
                        personal: r.user_id.is_some(),
                        rule: SortRule {
                            direction,
                            priority: r.priority,
                        },
                    })
                })
                .collect(),
        ),
        filter: merge_by_column(
            filter_rows
                .into_iter()
                .filter_map(|r| {
                    let operator = FilterOp::parse(&r.operator).ok()?;
                    Some(SettingRow {
                        column: r.column_key,
                        personal: r.user_id.is_some(),
                        rule: FilterRule {
                            operator,
                            value: r.value,
                        },
                    })
                })
                .collect(),
        ),
    };

    let statics = entity.static_fields();
    let view = resolve_view(&statics, &dynamic, &read_rights, &settings);
    Ok((view, read_rights))
}

/// GET /api/v1/table-view/{entity}?user_id=
///
/// The single resolver entry point: effective columns, the merged filter
/// predicate, and the multi-column sort list for one (user, entity) pair.
pub async fn resolve(
    Path(entity): Path<String>,
    Query(query): Query<UserQuery>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let entity = Entity::parse(&entity)?;
    let (view, _) = load_table_view(&state.pool, entity, query.user_id).await?;
    Ok(Json(DataResponse { data: view }))
}

/// PUT /api/v1/table-view/{entity}/settings
///
/// Save one setting row of any of the four kinds. `for_all` writes the
/// organization-wide row (NULL user); otherwise `user_id` is required.
pub async fn save_setting(
    Path(entity): Path<String>,
    State(state): State<AppState>,
    Json(input): Json<SaveSettingRequest>,
) -> AppResult<Response> {
    let entity = Entity::parse(&entity)?;
    let user_id = scope_user(input.user_id, input.for_all)?;

    match input.payload {
        SettingPayload::View { hidden, width } => {
            let row =
                TableSettingRepo::save_view(&state.pool, user_id, entity, &input.column, hidden, width)
                    .await?;
            Ok(Json(DataResponse { data: row }).into_response())
        }
        SettingPayload::Ordering { ordering } => {
            let row =
                TableSettingRepo::save_ordering(&state.pool, user_id, entity, &input.column, ordering)
                    .await?;
            Ok(Json(DataResponse { data: row }).into_response())
        }
        SettingPayload::Sort {
            direction,
            priority,
        } => {
            let direction = SortDirection::parse(&direction)?;
            let row = TableSettingRepo::save_sort(
                &state.pool,
                user_id,
                entity,
                &input.column,
                direction.as_str(),
                priority,
            )
            .await?;
            Ok(Json(DataResponse { data: row }).into_response())
        }
        SettingPayload::Filter { operator, value } => {
            let operator = FilterOp::parse(&operator)?;
            let row = TableSettingRepo::save_filter(
                &state.pool,
                user_id,
                entity,
                &input.column,
                operator.as_str(),
                &value,
            )
            .await?;
            Ok(Json(DataResponse { data: row }).into_response())
        }
    }
}

/// DELETE /api/v1/table-view/{entity}/settings/filter?column=&user_id=
///
/// Remove a personal (or, with `for_all`, the global) filter rule for one
/// column. Idempotent.
pub async fn delete_filter(
    Path(entity): Path<String>,
    Query(scope): Query<FilterScopeQuery>,
    State(state): State<AppState>,
) -> AppResult<StatusCode> {
    let entity = Entity::parse(&entity)?;
    let user_id = scope_user(scope.user_id, scope.for_all)?;

    let removed = TableSettingRepo::delete_filter(&state.pool, user_id, entity, &scope.column).await?;
    if removed {
        tracing::info!(
            entity = entity.as_str(),
            column = %scope.column,
            "Filter rule removed",
        );
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/table-view/{entity}/fields-ordering?user_id=
pub async fn get_fields_ordering(
    Path(entity): Path<String>,
    Query(query): Query<UserQuery>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let entity = Entity::parse(&entity)?;
    let rows = FieldsOrderingRepo::list_for(&state.pool, query.user_id, entity).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// PUT /api/v1/table-view/{entity}/fields-ordering
///
/// Replace the user's detail-view field order with the given sequence.
pub async fn save_fields_ordering(
    Path(entity): Path<String>,
    State(state): State<AppState>,
    Json(input): Json<SaveFieldsOrderingRequest>,
) -> AppResult<impl IntoResponse> {
    let entity = Entity::parse(&entity)?;
    let orderings: Vec<(String, i32)> = input
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| (field.clone(), i as i32 + 1))
        .collect();

    FieldsOrderingRepo::replace_all(&state.pool, input.user_id, entity, &orderings).await?;
    let rows = FieldsOrderingRepo::list_for(&state.pool, input.user_id, entity).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// DELETE /api/v1/table-view/{entity}/fields-ordering?user_id=
pub async fn reset_fields_ordering(
    Path(entity): Path<String>,
    Query(query): Query<UserQuery>,
    State(state): State<AppState>,
) -> AppResult<StatusCode> {
    let entity = Entity::parse(&entity)?;
    let removed = FieldsOrderingRepo::reset(&state.pool, query.user_id, entity).await?;
    tracing::info!(
        entity = entity.as_str(),
        user_id = query.user_id,
        removed,
        "Fields ordering reset",
    );
    Ok(StatusCode::NO_CONTENT)
}

fn scope_user(user_id: Option<DbId>, for_all: bool) -> AppResult<Option<DbId>> {
    if for_all {
        return Ok(None);
    }
    user_id
        .map(Some)
        .ok_or_else(|| AppError::BadRequest("user_id is required unless for_all is set".into()))
}
