//! HTTP request handlers, one module per resource.

pub mod actions;
pub mod dropdown_options;
pub mod dynamic_fields;
pub mod dynamic_values;
pub mod permissions;
pub mod records;
pub mod table_view;

use std::collections::BTreeMap;

use sqlx::PgPool;
use tempo_core::entity::{dynamic_field_key, Entity};
use tempo_core::permission::{resolve_field_rights, FieldGrant, FieldRight, ResolvableField};
use tempo_core::types::DbId;
use tempo_db::models::dynamic_field::DynamicField;
use tempo_db::repositories::{DynamicFieldRepo, FieldPermissionRepo, UserRoleRepo};

use crate::error::AppResult;

/// The full resolvable field set for an entity: static fields plus every
/// dynamic field projected onto its `dyn_<id>` key. Dynamic fields are
/// permission-gated the same way flagged static fields are, so a role
/// needs an explicit grant before its users can read one.
pub(crate) fn resolvable_fields(entity: Entity, dynamic: &[DynamicField]) -> Vec<ResolvableField> {
    let mut fields: Vec<ResolvableField> = entity
        .static_fields()
        .iter()
        .map(ResolvableField::from)
        .collect();
    for field in dynamic {
        fields.push(ResolvableField {
            key: dynamic_field_key(field.id),
            requires_permission: true,
        });
    }
    fields
}

/// Resolve one right for a user over the full field set of an entity.
pub(crate) async fn resolve_user_rights(
    pool: &PgPool,
    entity: Entity,
    user_id: DbId,
    right: FieldRight,
) -> AppResult<BTreeMap<String, bool>> {
    let roles = UserRoleRepo::roles_of(pool, user_id).await?;
    let grants: Vec<FieldGrant> = FieldPermissionRepo::list_for_entity(pool, entity)
        .await?
        .iter()
        .filter_map(|row| row.to_grant())
        .collect();
    let dynamic = DynamicFieldRepo::list_for_entity(pool, entity).await?;
    let fields = resolvable_fields(entity, &dynamic);
    Ok(resolve_field_rights(&fields, &grants, &roles, right))
}
