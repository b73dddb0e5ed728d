//! Repository for the `field_permissions` table.

use sqlx::PgPool;
use tempo_core::entity::Entity;
use tempo_core::permission::FieldRights;
use tempo_core::role::Role;

use crate::models::field_permission::FieldPermission;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, role_id, entity, field, can_view, can_read, can_write, can_delete, \
                       can_view_add_info, created_at, updated_at";

/// Provides data access for per-field permission grants.
pub struct FieldPermissionRepo;

impl FieldPermissionRepo {
    /// List every grant row for an entity (all roles). The caller filters
    /// by role set during resolution.
    pub async fn list_for_entity(
        pool: &PgPool,
        entity: Entity,
    ) -> Result<Vec<FieldPermission>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM field_permissions \
             WHERE entity = $1 \
             ORDER BY role_id, field"
        );
        sqlx::query_as::<_, FieldPermission>(&query)
            .bind(entity.as_str())
            .fetch_all(pool)
            .await
    }

    /// Upsert one (role, entity, field) grant row.
    ///
    /// The caller is expected to pass rights already run through the
    /// cascade normalization; storage takes them as-is.
    pub async fn upsert(
        pool: &PgPool,
        role: Role,
        entity: Entity,
        field: &str,
        rights: FieldRights,
    ) -> Result<FieldPermission, sqlx::Error> {
        let query = format!(
            "INSERT INTO field_permissions \
                (role_id, entity, field, can_view, can_read, can_write, can_delete, can_view_add_info) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (role_id, entity, field) \
             DO UPDATE SET \
                can_view = EXCLUDED.can_view, \
                can_read = EXCLUDED.can_read, \
                can_write = EXCLUDED.can_write, \
                can_delete = EXCLUDED.can_delete, \
                can_view_add_info = EXCLUDED.can_view_add_info, \
                updated_at = now() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FieldPermission>(&query)
            .bind(role.id())
            .bind(entity.as_str())
            .bind(field)
            .bind(rights.can_view)
            .bind(rights.can_read)
            .bind(rights.can_write)
            .bind(rights.can_delete)
            .bind(rights.can_view_add_info)
            .fetch_one(pool)
            .await
    }
}
